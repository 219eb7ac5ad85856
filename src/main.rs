fn main() {
    if let Err(err) = cumulus::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
