//! Generates the oracle protocol from `proto/entitlement.proto`.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/");

    tonic_prost_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&["proto/entitlement.proto"], &["proto/"])?;

    Ok(())
}
