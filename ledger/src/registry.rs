// Contract registry: name -> contract handle

use indexmap::IndexMap;
use log::debug;
use strum::IntoEnumIterator;

use crate::contracts::{Contract, ContractName};
use crate::error::{ContractError, ContractResult};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractRegistry {
    contracts: IndexMap<ContractName, Contract>,
}

impl ContractRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the four contracts with their default wiring
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.link(ContractName::iter().map(|name| (name, Contract::standard(name))));
        registry
    }

    /// Merge `contracts` into the registry, replacing existing entries by name
    pub fn link<I>(&mut self, contracts: I)
    where
        I: IntoIterator<Item = (ContractName, Contract)>,
    {
        for (name, contract) in contracts {
            debug!("Linking contract {}", name);
            self.contracts.insert(name, contract);
        }
    }

    pub fn get(&self, name: ContractName) -> ContractResult<&Contract> {
        self.contracts.get(&name).ok_or(ContractError::NotFound)
    }

    /// Look up a contract by its textual name
    pub fn resolve(&self, name: &str) -> ContractResult<&Contract> {
        self.get(ContractName::parse(name)?)
    }

    /// Linked names in first-link order; relinking keeps a name's position
    pub fn names(&self) -> impl Iterator<Item = ContractName> + '_ {
        self.contracts.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}
