fn main() {
    stealth_chase::game::run();
}
