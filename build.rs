fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");

    // Gather build-time info: git commit, compiler version, build time.
    built::write_built_file().expect("Failed to acquire build-time information");
}
