/// winapp build script.
///
/// The window apps only open real windows on Windows. Other targets still
/// build, running the apps against the headless window system, so flag that
/// at build time rather than leaving it to be discovered at runtime.
fn main() {
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" {
        println!(
            "cargo:warning=winapp targets Windows; building the headless window system \
             for CARGO_CFG_TARGET_OS = {target_os:?}"
        );
    }

    // Only re-run the build script when it changes.
    println!("cargo:rerun-if-changed=build.rs");
}
