//! Payment status transitions
//!
//! Reaching `ok` marks the linked entries paid and notifies the payer. The
//! side effects fire only when the status actually becomes `ok`, so gateway
//! retries and repeated saves of an already-paid payment are no-ops.

use crate::models::PaymentStatus;

/// Work to do after a status change is persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionEffects {
    pub mark_entries_paid: bool,
    pub notify: bool,
}

/// Result of planning a status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Same status again; nothing to write
    Unchanged,
    Applied {
        to: PaymentStatus,
        effects: TransitionEffects,
    },
}

/// Refused status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Payment cannot change from {from} to {to}")]
pub struct TransitionError {
    pub from: PaymentStatus,
    pub to: PaymentStatus,
}

/// Plan the move from the persisted status (`None` for a payment being
/// inserted) to `next`.
pub fn plan(previous: Option<PaymentStatus>, next: PaymentStatus) -> Result<Transition, TransitionError> {
    if let Some(from) = previous {
        if from == next {
            return Ok(Transition::Unchanged);
        }
        if !from.can_transition_to(next) {
            return Err(TransitionError { from, to: next });
        }
    }

    let becomes_ok = next == PaymentStatus::Ok && previous != Some(PaymentStatus::Ok);
    Ok(Transition::Applied {
        to: next,
        effects: TransitionEffects {
            mark_entries_paid: becomes_ok,
            notify: becomes_ok,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effects(previous: Option<PaymentStatus>, next: PaymentStatus) -> TransitionEffects {
        match plan(previous, next).unwrap() {
            Transition::Unchanged => TransitionEffects::default(),
            Transition::Applied { effects, .. } => effects,
        }
    }

    #[test]
    fn test_insert_as_ok_fires_effects() {
        let fx = effects(None, PaymentStatus::Ok);
        assert!(fx.mark_entries_paid);
        assert!(fx.notify);
    }

    #[test]
    fn test_created_to_ok_fires_effects() {
        assert!(effects(Some(PaymentStatus::Created), PaymentStatus::Ok).notify);
        assert!(effects(Some(PaymentStatus::Awaiting), PaymentStatus::Ok).notify);
    }

    #[test]
    fn test_non_ok_transitions_have_no_effects() {
        assert_eq!(
            effects(Some(PaymentStatus::Created), PaymentStatus::Awaiting),
            TransitionEffects::default()
        );
        assert_eq!(
            effects(Some(PaymentStatus::Awaiting), PaymentStatus::Failed),
            TransitionEffects::default()
        );
    }

    #[test]
    fn test_repeated_ok_saves_fire_once() {
        let mut persisted = None;
        let mut notifications = 0;
        for next in [
            PaymentStatus::Created,
            PaymentStatus::Awaiting,
            PaymentStatus::Ok,
            PaymentStatus::Ok,
            PaymentStatus::Ok,
        ] {
            if let Transition::Applied { to, effects } = plan(persisted, next).unwrap() {
                if effects.notify {
                    notifications += 1;
                }
                persisted = Some(to);
            }
        }
        assert_eq!(notifications, 1);
        assert_eq!(persisted, Some(PaymentStatus::Ok));
    }

    #[test]
    fn test_ok_is_not_downgraded() {
        assert_eq!(
            plan(Some(PaymentStatus::Ok), PaymentStatus::Awaiting),
            Err(TransitionError {
                from: PaymentStatus::Ok,
                to: PaymentStatus::Awaiting
            })
        );
    }

    #[test]
    fn test_canceled_is_terminal() {
        assert!(plan(Some(PaymentStatus::Canceled), PaymentStatus::Ok).is_err());
        assert!(plan(Some(PaymentStatus::Failed), PaymentStatus::Ok).is_err());
    }
}
