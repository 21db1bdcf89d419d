use coinlist_core::model::{Coin, CoinType};
use rand::{distributions::Alphanumeric, rngs::StdRng, Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use tempfile::NamedTempFile;

const NAME_PREFIX: &str = "Synthetic Coin ";

/// Deterministic coin list: roughly 80% active, 10% new, 30% tokens.
pub fn generate_coins(count: usize, seed: u64) -> Vec<Coin> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|idx| {
            let name = format!("{NAME_PREFIX}{idx:05}");
            let symbol = random_symbol(&mut rng);
            let kind = if rng.gen_bool(0.3) {
                CoinType::Token
            } else {
                CoinType::Coin
            };
            Coin::new(&name, &symbol, kind)
                .with_active(rng.gen_bool(0.8))
                .with_new(rng.gen_bool(0.1))
        })
        .collect()
}

fn random_symbol(rng: &mut StdRng) -> String {
    (0..4)
        .map(|_| rng.sample(Alphanumeric) as char)
        .collect::<String>()
        .to_uppercase()
}

pub fn write_jsonl_dataset(coins: &[Coin]) -> NamedTempFile {
    let file = NamedTempFile::new().expect("create temp dataset file");
    let mut writer = BufWriter::new(File::create(file.path()).expect("open dataset file"));
    for coin in coins {
        let line = serde_json::to_string(coin).expect("serialize jsonl record");
        writeln!(writer, "{line}").expect("write dataset row");
    }
    writer.flush().expect("flush dataset writer");
    file
}
