use std::{env, path::PathBuf};

const WATCHED_VARIABLES: &[&str] = &["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"];
const DEFAULT_TRIPLET: &str = "x64-windows";

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    // Only Windows builds need a hint; elsewhere pkg-config finds FFmpeg.
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }
    if env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    match vcpkg_ffmpeg_dir() {
        Some(dir) if dir.exists() => {
            warn(&format!(
                "FFMPEG_DIR is not set; found a vcpkg FFmpeg at {0}. Set FFMPEG_DIR={0} to use it explicitly.",
                dir.display()
            ));
            if env::var_os("VCPKGRS_DYNAMIC").is_none() {
                warn("Set VCPKGRS_DYNAMIC=1 if the vcpkg FFmpeg was built as DLLs.");
            }
        }
        Some(dir) => warn(&format!(
            "VCPKG_ROOT is set but {} does not exist; install FFmpeg with `vcpkg install ffmpeg`.",
            dir.display()
        )),
        None => warn("FFMPEG_DIR is not set. Install FFmpeg (e.g. via vcpkg) and point FFMPEG_DIR at it."),
    }
}

fn vcpkg_ffmpeg_dir() -> Option<PathBuf> {
    let root = env::var_os("VCPKG_ROOT")?;
    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| DEFAULT_TRIPLET.to_string());
    Some(PathBuf::from(root).join("installed").join(triplet))
}

fn warn(message: &str) {
    println!("cargo:warning={message}");
}
