use bb84::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("BB84 key agreement under channel noise (1024 qubits, seed 42)");
    println!();
    println!("  {:>14}  {:>6}  {:>10}  {:>8}", "channel", "p", "sifted", "QBER");

    for &p in &[0.0, 0.02, 0.05, 0.1, 0.2] {
        for channel in [
            NoiseChannel::BitFlip { p },
            NoiseChannel::Dephasing { p },
            NoiseChannel::Depolarizing { p },
        ] {
            let config = ProtocolConfig::default()
                .with_length(1024)
                .with_seed(42)
                .with_noise(channel);
            let record = Protocol::local(config)?.run().await?;
            let name = channel.to_string();
            let name = name.split('(').next().unwrap_or_default();
            println!(
                "  {:>14}  {:>6.2}  {:>10}  {:>7.2}%",
                name,
                p,
                record.keys.len(),
                record.verification.error_rate() * 100.0
            );
        }
    }
    Ok(())
}
