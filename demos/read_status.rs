use prema6000ctrl::{Device, DEFAULT_BAUDRATE};

#[tokio::main]
async fn main() -> prema6000ctrl::Result<()> {
    let path = "/dev/ttyUSB0".to_string();
    let mut device = Device::new(&path, DEFAULT_BAUDRATE)?;
    device.select_gpib_address(7).await?;
    print!("{}", device.status().await?);
    Ok(())
}
