fn is_delimiter(c: char) -> bool {
    matches!(c, '"' | '(' | ')' | '\'')
}

fn label<'a>(s: &'a str) -> &'a str {
    let open = '(';
    println!("debug: label for {}", s);
    s
}

fn main() {
    let quote = '"';
    eprintln!("quote is {}", quote);
    dbg!(is_delimiter(')'));
}
