//! Build script for fpdev.
//!
//! With the `vendor-sdk` feature the FFI backend is compiled, so the crate
//! links the okFrontPanel SDK using the same platform mapping the extension
//! build descriptor uses. Without it nothing is linked.

#[allow(dead_code)]
#[path = "src/core/platform.rs"]
mod platform;

#[allow(dead_code)]
#[path = "src/core/build_config.rs"]
mod build_config;

#[allow(dead_code)]
#[path = "src/core/cargo.rs"]
mod cargo;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/core/platform.rs");
    println!("cargo:rerun-if-changed=src/core/build_config.rs");
    println!("cargo:rerun-if-changed=src/core/cargo.rs");
    println!("cargo:rerun-if-env-changed=FPDEV_SDK_ROOT");

    if std::env::var_os("CARGO_FEATURE_VENDOR_SDK").is_none() {
        return;
    }

    let Some(platform) = platform::TargetPlatform::from_cargo_env() else {
        println!("cargo:warning=target platform unknown; okFrontPanel not linked");
        return;
    };

    let mut layout = build_config::VendorLayout::default();
    if let Ok(root) = std::env::var("FPDEV_SDK_ROOT") {
        layout.root = root;
    }

    let config = build_config::BuildConfiguration::for_platform_with(&platform, &layout);
    let directives = cargo::CargoDirectives::from_config(&config);
    if directives.is_empty() {
        println!(
            "cargo:warning=no okFrontPanel linkage for {}; vendor-sdk backend will not link",
            platform
        );
        return;
    }

    print!("{}", directives);
}
