pub mod ecb;
pub mod nbp;
pub mod rba;
pub mod util;

use crate::core::config::AppConfig;
use crate::core::{Registry, RateSource};
use anyhow::{Context, Result};

/// Builds one source per registered bank, sharing a single HTTP client.
pub fn build_sources(config: &AppConfig, registry: &Registry) -> Result<Vec<Box<dyn RateSource>>> {
    let client = util::build_client(config.timeout())?;
    let bank = |code: &str| {
        registry
            .by_code(code)
            .cloned()
            .with_context(|| format!("Bank {code} is not registered"))
    };

    Ok(vec![
        Box::new(ecb::EcbSource::new(
            &config.sources.ecb.base_url,
            client.clone(),
            bank("ECB")?,
        )),
        Box::new(nbp::NbpSource::new(
            &config.sources.nbp.base_url,
            client.clone(),
            bank("NBP")?,
        )),
        Box::new(rba::RbaSource::new(
            &config.sources.rba.base_url,
            client,
            bank("RBA")?,
        )),
    ])
}
