fn main() {
    if let Err(err) = quotecard::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
