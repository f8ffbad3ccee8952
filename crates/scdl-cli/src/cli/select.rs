//! Track selection lists such as `1,3-5` (1-based, as printed by `scdl list`).

use anyhow::{bail, Context, Result};
use std::collections::BTreeSet;

/// Parse `list` against a list of `len` tracks into sorted, distinct 0-based indices.
pub fn parse_selection(list: &str, len: usize) -> Result<Vec<usize>> {
    let mut picked = BTreeSet::new();
    for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (lo, hi) = match part.split_once('-') {
            Some((a, b)) => (parse_number(a)?, parse_number(b)?),
            None => {
                let n = parse_number(part)?;
                (n, n)
            }
        };
        if lo > hi {
            bail!("empty range {:?}", part);
        }
        if hi > len {
            bail!("track {} out of range (found {} tracks)", hi, len);
        }
        picked.extend(lo - 1..hi);
    }
    if picked.is_empty() {
        bail!("empty selection {:?}", list);
    }
    Ok(picked.into_iter().collect())
}

fn parse_number(s: &str) -> Result<usize> {
    let n: usize = s
        .trim()
        .parse()
        .with_context(|| format!("not a track number: {:?}", s))?;
    if n == 0 {
        bail!("track numbers start at 1");
    }
    Ok(n)
}
