//! Import helpers for coin list exports (JSON array or JSONL).

use coinlist_core::{model::Coin, validate::validate_coin};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

/// Loose record as found in exports; missing flags default to false and a
/// missing type to `coin`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportedCoin {
    pub name: Option<String>,
    pub symbol: String,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(rename = "type")]
    pub r#type: Option<String>,
}

pub fn from_exported(rec: ExportedCoin) -> Coin {
    Coin {
        name: rec.name.unwrap_or_else(|| rec.symbol.clone()),
        symbol: rec.symbol,
        is_new: rec.is_new,
        is_active: rec.is_active,
        r#type: rec.r#type.unwrap_or_else(|| "coin".to_owned()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    JsonArray,
    Jsonl,
}

pub fn detect_format<P: AsRef<Path>>(path: P) -> std::io::Result<ExportFormat> {
    let mut f = File::open(path)?;
    let mut buf = [0u8; 1];
    let n = f.read(&mut buf)?;
    if n > 0 && (buf[0] as char) == '[' {
        Ok(ExportFormat::JsonArray)
    } else {
        Ok(ExportFormat::Jsonl)
    }
}

pub fn import_coins_from_path<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<Coin>> {
    let coins = match detect_format(&path)? {
        ExportFormat::JsonArray => import_json_array(path)?,
        ExportFormat::Jsonl => import_jsonl(path)?,
    };
    for coin in &coins {
        validate_coin(coin)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    }
    Ok(coins)
}

fn import_json_array<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<Coin>> {
    let mut s = String::new();
    File::open(path)?.read_to_string(&mut s)?;
    let recs: Vec<ExportedCoin> = serde_json::from_str(&s)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    Ok(recs.into_iter().map(from_exported).collect())
}

fn import_jsonl<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<Coin>> {
    let f = File::open(path)?;
    let reader = BufReader::new(f);
    let mut out = Vec::new();
    for line in reader.lines() {
        let l = line?;
        if l.trim().is_empty() {
            continue;
        }
        let rec: ExportedCoin = serde_json::from_str(&l)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        out.push(from_exported(rec));
    }
    Ok(out)
}
