//! Codomain chain: ordered transforms applied after quantization.

mod maps;

pub use maps::{CodomainMap, CodomainMapContext};

use pixels_common::{verify_codomain, CodomainMapDef, ConfigError};

/// Ordered list of codomain transforms.
///
/// The first context is always the identity and is never removed.
#[derive(Debug, Clone, PartialEq)]
pub struct CodomainChain {
    start: i32,
    end: i32,
    contexts: Vec<CodomainMapContext>,
}

impl CodomainChain {
    /// Chain holding only the identity on `[start, end]`.
    pub fn new(start: i32, end: i32) -> Result<Self, ConfigError> {
        verify_codomain(start, end)?;
        Ok(Self {
            start,
            end,
            contexts: vec![CodomainMapContext::identity(start, end)],
        })
    }

    /// Chain with the given persisted maps after the identity.
    pub fn with_maps(start: i32, end: i32, maps: &[CodomainMapDef]) -> Result<Self, ConfigError> {
        let mut chain = Self::new(start, end)?;
        for def in maps {
            chain.add(def)?;
        }
        Ok(chain)
    }

    pub fn interval(&self) -> (i32, i32) {
        (self.start, self.end)
    }

    /// Move every context to the new interval.
    pub fn set_interval(&mut self, start: i32, end: i32) -> Result<(), ConfigError> {
        verify_codomain(start, end)?;
        self.start = start;
        self.end = end;
        for ctx in &mut self.contexts {
            ctx.set_codomain(start, end);
        }
        Ok(())
    }

    /// Append a transform. Only one context of each kind is allowed.
    pub fn add(&mut self, def: &CodomainMapDef) -> Result<(), ConfigError> {
        if self.position(def.kind()).is_some() {
            return Err(ConfigError::DuplicateCodomainMap(def.kind().to_string()));
        }
        let ctx = CodomainMapContext::from_def(def, self.start, self.end)?;
        self.contexts.push(ctx);
        Ok(())
    }

    /// Replace the context of the same kind.
    pub fn update(&mut self, def: &CodomainMapDef) -> Result<(), ConfigError> {
        let index = self.position(def.kind()).ok_or_else(|| {
            ConfigError::Settings(format!("codomain map '{}' is not in the chain", def.kind()))
        })?;
        self.contexts[index] = CodomainMapContext::from_def(def, self.start, self.end)?;
        Ok(())
    }

    /// Remove the context of the given kind. Returns whether one was removed.
    pub fn remove_map(&mut self, kind: &str) -> bool {
        match self.position(kind) {
            Some(index) => {
                self.contexts.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove every context except the identity.
    pub fn remove(&mut self) {
        self.contexts.retain(CodomainMapContext::is_identity);
    }

    fn position(&self, kind: &str) -> Option<usize> {
        self.contexts
            .iter()
            .position(|ctx| !ctx.is_identity() && ctx.kind() == kind)
    }

    /// Apply every context in order.
    #[inline]
    pub fn transform(&self, value: i32) -> i32 {
        self.contexts
            .iter()
            .fold(value, |v, ctx| ctx.transform(v))
    }

    /// Whether the chain reduces to clamping to the interval.
    pub fn is_identity(&self) -> bool {
        self.contexts.len() == 1
    }

    pub fn contexts(&self) -> &[CodomainMapContext] {
        &self.contexts
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Persisted form of every non-identity context.
    pub fn to_defs(&self) -> Vec<CodomainMapDef> {
        self.contexts.iter().filter_map(CodomainMapContext::to_def).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_chain_is_identity() {
        let chain = CodomainChain::new(0, 255).unwrap();
        assert_eq!(chain.len(), 1);
        assert!(chain.contexts()[0].is_identity());
        assert_eq!(chain.transform(42), 42);
    }

    #[test]
    fn test_invalid_interval() {
        assert!(CodomainChain::new(-1, 255).is_err());
        let mut chain = CodomainChain::new(0, 255).unwrap();
        assert!(chain.set_interval(200, 100).is_err());
        assert_eq!(chain.interval(), (0, 255));
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let mut chain = CodomainChain::new(0, 255).unwrap();
        chain.add(&CodomainMapDef::ReverseIntensity).unwrap();
        assert_eq!(
            chain.add(&CodomainMapDef::ReverseIntensity),
            Err(ConfigError::DuplicateCodomainMap("reverse_intensity".to_string()))
        );
    }

    #[test]
    fn test_remove_map() {
        let mut chain =
            CodomainChain::with_maps(0, 255, &[CodomainMapDef::ReverseIntensity]).unwrap();
        assert!(chain.remove_map("reverse_intensity"));
        assert!(!chain.remove_map("reverse_intensity"));
        assert!(!chain.remove_map("identity"));
        assert!(chain.is_identity());
    }
}
