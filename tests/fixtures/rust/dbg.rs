fn main() {
    let x = 5;
    dbg!(x);

    println!("debug: single line");

    println!(
        "Results: x={}, y={}",
        10,
        20
    );

    // dbg!(x * 2);
    let name = String::from("it's fine");
    eprintln!("{debug}", debug = name);
}

fn longest<'a>(a: &'a str, b: &'a str) -> &'a str {
    if a.len() > b.len() { a } else { b }
}
