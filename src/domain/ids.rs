use chrono::Utc;
use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// `ORD-<epoch millis>-<9 uppercase base36 chars>`.
pub fn order_number() -> String {
    format!(
        "ORD-{}-{}",
        Utc::now().timestamp_millis(),
        random_base36(9).to_uppercase()
    )
}

/// `TXN-<epoch millis>-<13 base36 chars>`.
pub fn transaction_id() -> String {
    format!("TXN-{}-{}", Utc::now().timestamp_millis(), random_base36(13))
}
