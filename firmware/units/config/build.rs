fn main() -> Result<(), fw_object_build::ConfigError> {
    fw_object_build::configure()?;
    Ok(())
}
