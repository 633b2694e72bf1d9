fn main() {
    unawait::start_cli();
}
