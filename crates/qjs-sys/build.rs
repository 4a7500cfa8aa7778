use std::env;
use std::fs;
use std::path::PathBuf;

// quickjs-ng release tag from quickjs-ng/quickjs releases
// Update this when a new version is needed
const QUICKJS_NG_VERSION: &str = "v0.10.0";

// Engine translation units, relative to the extracted source root
const ENGINE_SOURCES: &[&str] = &[
    "quickjs.c",
    "libregexp.c",
    "libunicode.c",
    "cutils.c",
    "xsum.c",
];

fn main() {
    println!("cargo:rerun-if-env-changed=QUICKJS_NG_VERSION");

    let src_dir = download_quickjs();
    compile_quickjs(&src_dir);
}

fn download_quickjs() -> PathBuf {
    let version =
        env::var("QUICKJS_NG_VERSION").unwrap_or_else(|_| QUICKJS_NG_VERSION.to_string());

    // Cache directory
    let cache_dir = get_cache_dir();
    let qjs_dir = cache_dir.join(&version);

    // Check if already downloaded
    let marker = qjs_dir.join(".downloaded");
    if marker.exists() {
        println!(
            "cargo:warning=Using cached quickjs-ng from {}",
            qjs_dir.display()
        );
        return find_src_dir(&qjs_dir);
    }

    let url = format!(
        "https://github.com/quickjs-ng/quickjs/archive/refs/tags/{}.tar.gz",
        version
    );

    println!("cargo:warning=Downloading quickjs-ng from {}", url);

    fs::create_dir_all(&qjs_dir).expect("Failed to create cache directory");

    // Download using ureq - stream directly to the decoder to avoid memory limits
    let response = ureq::get(&url)
        .call()
        .unwrap_or_else(|e| panic!("Failed to download quickjs-ng: {}. URL: {}", e, url));

    let reader = response.into_body().into_reader();
    let tar_gz = flate2::read::GzDecoder::new(reader);
    let mut archive = tar::Archive::new(tar_gz);

    archive
        .unpack(&qjs_dir)
        .expect("Failed to extract quickjs-ng archive");

    fs::write(&marker, "").expect("Failed to create marker file");

    println!(
        "cargo:warning=quickjs-ng extracted to {}",
        qjs_dir.display()
    );

    find_src_dir(&qjs_dir)
}

fn compile_quickjs(src_dir: &PathBuf) {
    let mut build = cc::Build::new();

    build
        .include(src_dir)
        .define("_GNU_SOURCE", None)
        .flag_if_supported("-Wno-unused-parameter")
        .flag_if_supported("-Wno-sign-compare")
        .flag_if_supported("-funsigned-char");

    for source in ENGINE_SOURCES {
        let path = src_dir.join(source);
        if path.exists() {
            build.file(path);
        }
    }

    build.compile("quickjs");

    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os == "linux" {
        println!("cargo:rustc-link-lib=m");
        println!("cargo:rustc-link-lib=pthread");
    }

    println!("cargo:include={}", src_dir.display());
}

fn find_src_dir(qjs_dir: &PathBuf) -> PathBuf {
    // The GitHub tarball extracts to a quickjs-<version> subdirectory
    if let Ok(entries) = fs::read_dir(qjs_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() && path.join("quickjs.h").exists() {
                return path;
            }
        }
    }

    // Fallback to qjs_dir itself
    qjs_dir.clone()
}

fn get_cache_dir() -> PathBuf {
    // Try CARGO_HOME first, then fallback to home directory
    if let Ok(cargo_home) = env::var("CARGO_HOME") {
        return PathBuf::from(cargo_home).join("cache").join("quickjs-ng");
    }

    if let Ok(home) = env::var("HOME") {
        return PathBuf::from(home)
            .join(".cargo")
            .join("cache")
            .join("quickjs-ng");
    }

    if let Ok(userprofile) = env::var("USERPROFILE") {
        return PathBuf::from(userprofile)
            .join(".cargo")
            .join("cache")
            .join("quickjs-ng");
    }

    // Fallback to OUT_DIR
    PathBuf::from(env::var("OUT_DIR").unwrap()).join("quickjs-ng-cache")
}
