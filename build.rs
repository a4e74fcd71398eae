use std::io::ErrorKind;
use std::path::Path;
use std::{fs, io};

fn main() -> io::Result<()> {
    build_protos()?;
    Ok(())
}

fn build_protos() -> io::Result<()> {
    idempotent_create_dir("./generated/")?;

    // The KV server half is only used by the in-process etcd stand-in in tests.
    tonic_build::configure()
        .out_dir("./generated/")
        .compile(&["./protos/etcd.proto"], &["./protos/"])?;

    tonic_build::configure()
        .build_server(false)
        .out_dir("./generated/")
        .compile(&["./protos/pd.proto"], &["./protos/"])
}

fn idempotent_create_dir<P: AsRef<Path>>(path: P) -> io::Result<()> {
    match fs::create_dir(path) {
        Ok(_) => Ok(()),
        Err(e) => match e.kind() {
            ErrorKind::AlreadyExists => Ok(()),
            _ => Err(e),
        },
    }
}
