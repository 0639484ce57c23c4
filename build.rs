fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Stamped into run reports
    println!(
        "cargo:rustc-env=TUDOCHAIN_BUILD_TIME={}",
        chrono::Utc::now().to_rfc3339()
    );

    let hash = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string());

    if let Some(hash) = hash {
        println!("cargo:rustc-env=TUDOCHAIN_GIT_HASH={hash}");
    }
}
