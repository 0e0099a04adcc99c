use prema6000ctrl::{proto::command::ReturnMode, Device, DEFAULT_BAUDRATE};

#[tokio::main]
async fn main() -> prema6000ctrl::Result<()> {
    let path = "/dev/ttyUSB0".to_string();
    let mut device = Device::new(&path, DEFAULT_BAUDRATE)?;
    device.select_gpib_address(7).await?;

    // Status block is needed to tell the unit.
    device
        .set_return_mode(ReturnMode::MeasurementAndStatus)
        .await?;

    loop {
        let mea = device.measurement().await?;
        println!("Value: {}", mea);
    }
}
