//! Generates the SuperBuilder gRPC client (and the server trait the test
//! middleware implements) from `proto/superbuilder_middleware.proto`.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let protoc = protoc_bin_vendored::protoc_bin_path()?;
    // SAFETY: build scripts are single-threaded
    unsafe { std::env::set_var("PROTOC", protoc) };

    println!("cargo:rerun-if-changed=proto/superbuilder_middleware.proto");

    tonic_prost_build::configure()
        .build_client(true)
        .build_server(true)
        .compile_protos(&["proto/superbuilder_middleware.proto"], &["proto"])?;
    Ok(())
}
