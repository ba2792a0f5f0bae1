//! Firewall-level blocking of alerting addresses
//!
//! Appends an iptables DROP rule for a source address. Only invoked after
//! a dispatched alert, and only when auto-block is enabled.

use std::collections::HashSet;
use std::net::IpAddr;
use std::process::Command;

/// Blocks source addresses with iptables
pub struct IpBlocker {
    enabled: bool,
    blocked: HashSet<IpAddr>,
}

impl IpBlocker {
    pub fn new(enabled: bool) -> Self {
        IpBlocker {
            enabled,
            blocked: HashSet::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Block an address at the network layer
    ///
    /// Returns true iff the address is now denied. Disabled blockers,
    /// already-blocked addresses, loopback, and iptables failures all
    /// report false; command failures are logged, never propagated.
    pub fn block(&mut self, addr: IpAddr) -> bool {
        if !self.enabled {
            return false;
        }

        if self.blocked.contains(&addr) {
            log::info!("Address {} is already blocked", addr);
            return false;
        }

        if addr.is_loopback() {
            log::warn!("Refusing to block loopback address {}", addr);
            return false;
        }

        let output = Command::new("iptables")
            .args(["-A", "INPUT", "-s", &addr.to_string(), "-j", "DROP"])
            .output();

        match output {
            Ok(output) if output.status.success() => {
                log::info!("Blocked address {}", addr);
                self.blocked.insert(addr);
                true
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                log::error!("Failed to block {}: {}", addr, stderr.trim());
                false
            }
            Err(e) => {
                log::error!("iptables invocation failed for {}: {}", addr, e);
                false
            }
        }
    }

    pub fn is_blocked(&self, addr: &IpAddr) -> bool {
        self.blocked.contains(addr)
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_disabled_blocker_never_blocks() {
        let mut blocker = IpBlocker::new(false);
        let addr = IpAddr::from_str("203.0.113.7").unwrap();

        assert!(!blocker.block(addr));
        assert!(!blocker.is_blocked(&addr));
        assert_eq!(blocker.blocked_count(), 0);
    }

    #[test]
    fn test_loopback_refused() {
        let mut blocker = IpBlocker::new(true);

        assert!(!blocker.block(IpAddr::from_str("127.0.0.1").unwrap()));
        assert!(!blocker.block(IpAddr::from_str("::1").unwrap()));
        assert_eq!(blocker.blocked_count(), 0);
    }
}
