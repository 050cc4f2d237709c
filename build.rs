extern crate image;
use std::{env, fs};
use std::path::PathBuf;
use image::{Rgba, RgbaImage};

fn out_dir() -> String {
    env::var("OUT_DIR").expect("No OUT_DIR env var")
}

// A filament spool: orange ring around a dark hub, transparent outside.
fn spool_pixel(x: u32, y: u32) -> Rgba<u8> {
    let dx = x as f32 - 15.5;
    let dy = y as f32 - 15.5;
    let distance = (dx * dx + dy * dy).sqrt();

    if distance > 15.5 {
        Rgba([0, 0, 0, 0])
    }
    else if distance > 6.0 {
        Rgba([0xFF, 0x57, 0x22, 0xFF])
    }
    else if distance > 3.0 {
        Rgba([0x42, 0x42, 0x42, 0xFF])
    }
    else {
        Rgba([0, 0, 0, 0])
    }
}

fn build_window_icon() {
    let out_dir = out_dir();
    let out_path: PathBuf = [out_dir.as_str(), "icon-32-rgba"].iter().collect();

    let img = RgbaImage::from_fn(32, 32, spool_pixel);
    let rgba = img.into_raw();
    println!("cargo:rerun-if-changed=build.rs");
    fs::write(&out_path, rgba).expect("Failed to write to icon-32-rgba");
}

fn main() {
    build_window_icon();
}
