fn main() -> std::io::Result<()> {
    println!("cargo:rerun-if-changed=proto/invite.proto");
    prost_build::compile_protos(&["proto/invite.proto"], &["proto/"])
}
