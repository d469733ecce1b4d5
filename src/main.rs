fn main() {
    bundlekit::app::startup::startup();
}
