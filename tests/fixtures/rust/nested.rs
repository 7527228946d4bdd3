use std::thread;

fn main() {
    let x = 7;
    let handle = thread::spawn(move || {
        dbg!(x);
        println!("worker done");
    });
    handle.join().unwrap();
    let items: Vec<i32> = (0..3).map(|i| {
        eprintln!("debug: item {}", i);
        i * 2
    }).collect();
}
