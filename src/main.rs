fn main() {
    if let Err(e) = gitca::cli::run() {
        eprintln!("Error: {e}");
        std::process::exit(gitca::error::exit_code(&e));
    }
}
