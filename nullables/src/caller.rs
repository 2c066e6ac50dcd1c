//! Nullable external caller: records invocations instead of performing them.

use agora_governance::ExternalCaller;
use agora_types::Address;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct NullCaller {
    calls: Vec<(Address, Vec<u8>)>,
    failing: HashSet<Address>,
}

impl NullCaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls to `target` fail from now on.
    pub fn fail_target(&mut self, target: Address) {
        self.failing.insert(target);
    }

    pub fn heal_target(&mut self, target: &Address) {
        self.failing.remove(target);
    }

    /// Successful invocations in order.
    pub fn calls(&self) -> &[(Address, Vec<u8>)] {
        &self.calls
    }
}

impl ExternalCaller for NullCaller {
    fn invoke(&mut self, target: &Address, payload: &[u8]) -> Result<(), String> {
        if self.failing.contains(target) {
            return Err(format!("call to {target} reverted"));
        }
        self.calls.push((*target, payload.to_vec()));
        Ok(())
    }
}
