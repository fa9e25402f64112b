fn main() {
    deptree::cli::run();
}
