fn main() {
    reparse::run();
}
