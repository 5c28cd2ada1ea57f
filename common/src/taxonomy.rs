//! Taxonomy resolver
//!
//! Finds a taxonomic unit for a (taxon, rank) pair through an ordered list of
//! seed strategies, then walks the enumeration tree to collect one name per
//! rank. A chain of two entries or fewer is treated as unresolved.

use crate::error::{Error, Result};
use crate::store::CollectionStore;
use crate::types::TaxonomyChain;

/// Minimum number of ranks for a usable chain (exclusive)
const MIN_RESOLVED_RANKS: usize = 2;

/// Ways of finding a starting unit id, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedStrategy {
    /// The taxon itself as a named unit
    Direct,
    /// First word of a species or subspecies name as the genus
    GenusOfBinomial,
    /// Family recorded on occurrences with this scientific name
    OccurrenceFamily,
}

impl SeedStrategy {
    pub const ORDER: &'static [SeedStrategy] = &[
        SeedStrategy::Direct,
        SeedStrategy::GenusOfBinomial,
        SeedStrategy::OccurrenceFamily,
    ];

    pub fn applies(&self, rank: &str) -> bool {
        match self {
            SeedStrategy::Direct => true,
            SeedStrategy::GenusOfBinomial => matches!(rank, "Species" | "Subspecies"),
            SeedStrategy::OccurrenceFamily => matches!(
                rank,
                "Genus" | "Species" | "Subspecies" | "Subfamily" | "Family"
            ),
        }
    }

    /// Record this strategy's seed entry in `chain` and return the unit id,
    /// if the store knows one.
    pub fn seed<S: CollectionStore + ?Sized>(
        &self,
        store: &S,
        taxon: &str,
        rank: &str,
        chain: &mut TaxonomyChain,
    ) -> Result<Option<i64>> {
        match self {
            SeedStrategy::Direct => {
                chain.set(rank, taxon);
                store.taxon_id(taxon)
            }
            SeedStrategy::GenusOfBinomial => {
                let Some(genus) = taxon.split_whitespace().next() else {
                    return Ok(None);
                };
                chain.set("Genus", genus);
                store.taxon_id(genus)
            }
            SeedStrategy::OccurrenceFamily => match store.occurrence_family(taxon)? {
                Some(family) if !family.trim().is_empty() => {
                    chain.set("Family", &family);
                    store.taxon_id(&family)
                }
                _ => Ok(None),
            },
        }
    }
}

/// Build the rank chain for `taxon` at `rank`
pub fn resolve_taxonomy<S: CollectionStore + ?Sized>(
    store: &S,
    taxon: &str,
    rank: &str,
) -> Result<TaxonomyChain> {
    let mut chain = TaxonomyChain::new();
    let mut tid = None;

    for strategy in SeedStrategy::ORDER.iter().filter(|s| s.applies(rank)) {
        tid = strategy.seed(store, taxon, rank, &mut chain)?;
        if tid.is_some() {
            break;
        }
    }

    if let Some(tid) = tid {
        for ancestor in store.ancestors(tid)? {
            chain.insert_if_absent(&ancestor.rank_name, &ancestor.sciname);
        }
    }

    if chain.rank_count() > MIN_RESOLVED_RANKS {
        Ok(chain)
    } else {
        Err(Error::Resolution(format!("{} ({})", taxon, rank)))
    }
}
