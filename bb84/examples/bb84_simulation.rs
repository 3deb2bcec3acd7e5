use bb84::prelude::*;

/// One run with the original four-qubit choices, printed with its circuit.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let alice = PartyChoices::new(
        vec![Bit::Zero, Bit::One, Bit::One, Bit::Zero],
        vec![Basis::Z, Basis::X, Basis::Z, Basis::X],
    );
    let bob_bases = vec![Basis::Z, Basis::Z, Basis::Z, Basis::X];

    let mut protocol = Protocol::local(ProtocolConfig::default().with_seed(0))?;
    let record = protocol.run_with_choices(alice, bob_bases).await?;
    print!("{}", record.report().with_circuit());
    Ok(())
}
