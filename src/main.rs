fn main() {
    if let Err(e) = klondike_turn::run() {
        eprintln!("klondike_turn: {:#}", e);
        std::process::exit(1);
    }
}
