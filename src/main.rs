fn main() {
    if let Err(err) = visitlog_lib::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
