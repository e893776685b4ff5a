fn main() {
    // Tell cargo to recompile when the bundled assets change.
    // The include_dir! macro embeds public/ at compile time,
    // but cargo doesn't track non-Rust files automatically.
    println!("cargo:rerun-if-changed=public");
}
