//! PaymentLedger unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use checkout_repo::InMemoryRepo;
    use checkout_types::{
        AppError, NewPayment, OrderReference, Payment, PaymentFilter, PaymentId, PaymentMethod,
        PaymentRepository, PaymentStatus, RepoError, Transition, UserId,
    };

    use crate::PaymentLedger;

    /// Simple in-memory store for testing the ledger.
    pub struct MockRepo {
        payments: Mutex<HashMap<PaymentId, Payment>>,
    }

    impl MockRepo {
        pub fn new() -> Self {
            Self {
                payments: Mutex::new(HashMap::new()),
            }
        }

        fn len(&self) -> usize {
            self.payments.lock().unwrap().len()
        }

        fn force_status(&self, id: PaymentId, status: PaymentStatus) {
            if let Some(p) = self.payments.lock().unwrap().get_mut(&id) {
                p.status = status;
            }
        }
    }

    #[async_trait]
    impl PaymentRepository for MockRepo {
        async fn insert(&self, payment: Payment) -> Result<Payment, RepoError> {
            let mut payments = self.payments.lock().unwrap();
            if let Some(key) = &payment.idempotency_key {
                if payments
                    .values()
                    .any(|p| p.idempotency_key.as_ref() == Some(key))
                {
                    return Err(RepoError::Conflict(key.clone()));
                }
            }
            payments.insert(payment.id, payment.clone());
            Ok(payment)
        }

        async fn get(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
            Ok(self.payments.lock().unwrap().get(&id).cloned())
        }

        async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Payment>, RepoError> {
            Ok(self
                .payments
                .lock()
                .unwrap()
                .values()
                .find(|p| p.idempotency_key.as_deref() == Some(key))
                .cloned())
        }

        async fn list(&self, filter: PaymentFilter) -> Result<Vec<Payment>, RepoError> {
            Ok(self
                .payments
                .lock()
                .unwrap()
                .values()
                .filter(|p| filter.matches(p))
                .cloned()
                .collect())
        }

        async fn compare_and_set_status(
            &self,
            id: PaymentId,
            expected: PaymentStatus,
            next: PaymentStatus,
        ) -> Result<bool, RepoError> {
            match self.payments.lock().unwrap().get_mut(&id) {
                Some(p) if p.status == expected => {
                    p.status = next;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn delete(&self, id: PaymentId) -> Result<bool, RepoError> {
            Ok(self.payments.lock().unwrap().remove(&id).is_some())
        }
    }

    /// Store that lets another writer cancel the record right before the
    /// first compare-and-set lands.
    struct RacingRepo {
        inner: MockRepo,
        raced: AtomicBool,
    }

    #[async_trait]
    impl PaymentRepository for RacingRepo {
        async fn insert(&self, payment: Payment) -> Result<Payment, RepoError> {
            self.inner.insert(payment).await
        }

        async fn get(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
            self.inner.get(id).await
        }

        async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Payment>, RepoError> {
            self.inner.find_by_idempotency_key(key).await
        }

        async fn list(&self, filter: PaymentFilter) -> Result<Vec<Payment>, RepoError> {
            self.inner.list(filter).await
        }

        async fn compare_and_set_status(
            &self,
            id: PaymentId,
            expected: PaymentStatus,
            next: PaymentStatus,
        ) -> Result<bool, RepoError> {
            if !self.raced.swap(true, Ordering::SeqCst) {
                self.inner.force_status(id, PaymentStatus::Cancelled);
            }
            self.inner.compare_and_set_status(id, expected, next).await
        }

        async fn delete(&self, id: PaymentId) -> Result<bool, RepoError> {
            self.inner.delete(id).await
        }
    }

    /// Store where another create claims the key between the ledger's
    /// lookup and its insert: the first key lookup misses.
    struct KeyRaceRepo {
        inner: MockRepo,
        missed: AtomicBool,
    }

    #[async_trait]
    impl PaymentRepository for KeyRaceRepo {
        async fn insert(&self, payment: Payment) -> Result<Payment, RepoError> {
            self.inner.insert(payment).await
        }

        async fn get(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
            self.inner.get(id).await
        }

        async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Payment>, RepoError> {
            if !self.missed.swap(true, Ordering::SeqCst) {
                return Ok(None);
            }
            self.inner.find_by_idempotency_key(key).await
        }

        async fn list(&self, filter: PaymentFilter) -> Result<Vec<Payment>, RepoError> {
            self.inner.list(filter).await
        }

        async fn compare_and_set_status(
            &self,
            id: PaymentId,
            expected: PaymentStatus,
            next: PaymentStatus,
        ) -> Result<bool, RepoError> {
            self.inner.compare_and_set_status(id, expected, next).await
        }

        async fn delete(&self, id: PaymentId) -> Result<bool, RepoError> {
            self.inner.delete(id).await
        }
    }

    fn new_payment(amount: Decimal) -> NewPayment {
        NewPayment {
            amount,
            payment_method: PaymentMethod::CreditCard,
            order_ref: OrderReference::new(1001),
            customer_name: "Ana Souza".to_string(),
            customer_tax_id: "123.456.789-00".to_string(),
            requesting_user_id: UserId::new(7),
            idempotency_key: None,
        }
    }

    fn ledger() -> PaymentLedger<MockRepo> {
        PaymentLedger::new(MockRepo::new())
    }

    fn assert_invalid_transition(
        result: Result<Payment, AppError>,
        from: PaymentStatus,
        requested: Transition,
    ) {
        match result {
            Err(AppError::InvalidTransition {
                from: f,
                requested: r,
            }) => {
                assert_eq!(f, from);
                assert_eq!(r, requested);
            }
            other => panic!("expected InvalidTransition, got {:?}", other),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Creation
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_payment() {
        let ledger = ledger();

        let payment = ledger.create(new_payment(dec!(99.90))).await.unwrap();

        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.amount, dec!(99.90));
        assert_eq!(payment.requesting_user_id, UserId::new(7));
        assert_eq!(ledger.repo().len(), 1);
    }

    #[tokio::test]
    async fn test_create_zero_amount_fails() {
        let ledger = ledger();

        let result = ledger.create(new_payment(Decimal::ZERO)).await;

        assert!(matches!(result, Err(AppError::InvalidPayment(_))));
        assert_eq!(ledger.repo().len(), 0);
    }

    #[tokio::test]
    async fn test_create_negative_amount_fails() {
        let ledger = ledger();

        let result = ledger.create(new_payment(dec!(-5))).await;

        assert!(matches!(result, Err(AppError::InvalidPayment(_))));
        assert_eq!(ledger.repo().len(), 0);
    }

    #[tokio::test]
    async fn test_create_blank_tax_id_fails() {
        let ledger = ledger();
        let mut new = new_payment(dec!(10));
        new.customer_tax_id = "  ".to_string();

        let result = ledger.create(new).await;

        assert!(matches!(result, Err(AppError::InvalidPayment(_))));
        assert_eq!(ledger.repo().len(), 0);
    }

    #[tokio::test]
    async fn test_create_with_same_idempotency_key_returns_existing() {
        let ledger = ledger();
        let mut new = new_payment(dec!(10));
        new.idempotency_key = Some("order-1001".to_string());

        let first = ledger.create(new.clone()).await.unwrap();
        let second = ledger.create(new).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(ledger.repo().len(), 1);
    }

    #[tokio::test]
    async fn test_key_reused_for_another_customer_conflicts() {
        let ledger = ledger();
        let mut new = new_payment(dec!(10));
        new.idempotency_key = Some("order-1001".to_string());
        ledger.create(new.clone()).await.unwrap();

        new.customer_tax_id = "987.654.321-00".to_string();
        let result = ledger.create(new).await;

        assert!(matches!(result, Err(AppError::IdempotencyConflict(_))));
        assert_eq!(ledger.repo().len(), 1);
    }

    #[tokio::test]
    async fn test_key_reused_by_another_user_conflicts() {
        let ledger = ledger();
        let mut new = new_payment(dec!(10));
        new.idempotency_key = Some("order-1001".to_string());
        ledger.create(new.clone()).await.unwrap();

        new.requesting_user_id = UserId::new(8);
        let result = ledger.create(new).await;

        assert!(matches!(result, Err(AppError::IdempotencyConflict(_))));
    }

    #[tokio::test]
    async fn test_lost_key_race_returns_winner_for_same_owner() {
        let inner = MockRepo::new();
        let mut new = new_payment(dec!(10));
        new.idempotency_key = Some("order-1001".to_string());
        let winner = inner.insert(Payment::pending(new.clone()).unwrap()).await.unwrap();
        let ledger = PaymentLedger::new(KeyRaceRepo {
            inner,
            missed: AtomicBool::new(false),
        });

        let result = ledger.create(new).await.unwrap();

        assert_eq!(result.id, winner.id);
    }

    #[tokio::test]
    async fn test_lost_key_race_to_another_customer_conflicts() {
        let inner = MockRepo::new();
        let mut new = new_payment(dec!(10));
        new.idempotency_key = Some("order-1001".to_string());
        inner.insert(Payment::pending(new.clone()).unwrap()).await.unwrap();
        let ledger = PaymentLedger::new(KeyRaceRepo {
            inner,
            missed: AtomicBool::new(false),
        });

        new.customer_tax_id = "987.654.321-00".to_string();
        let result = ledger.create(new).await;

        assert!(matches!(result, Err(AppError::IdempotencyConflict(_))));
        assert_eq!(ledger.repo().inner.len(), 1);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_approve_twice_fails() {
        let ledger = ledger();
        let payment = ledger.create(new_payment(dec!(10))).await.unwrap();

        let approved = ledger.approve(payment.id).await.unwrap();
        assert_eq!(approved.status, PaymentStatus::Approved);

        assert_invalid_transition(
            ledger.approve(payment.id).await,
            PaymentStatus::Approved,
            Transition::Approve,
        );
    }

    #[tokio::test]
    async fn test_cancel_twice_fails() {
        let ledger = ledger();
        let payment = ledger.create(new_payment(dec!(10))).await.unwrap();

        let cancelled = ledger.cancel(payment.id).await.unwrap();
        assert_eq!(cancelled.status, PaymentStatus::Cancelled);

        assert_invalid_transition(
            ledger.cancel(payment.id).await,
            PaymentStatus::Cancelled,
            Transition::Cancel,
        );
    }

    #[tokio::test]
    async fn test_approved_can_be_cancelled_once() {
        let ledger = ledger();
        let payment = ledger.create(new_payment(dec!(10))).await.unwrap();
        ledger.approve(payment.id).await.unwrap();

        let cancelled = ledger.cancel(payment.id).await.unwrap();

        assert_eq!(cancelled.status, PaymentStatus::Cancelled);
        assert!(ledger.cancel(payment.id).await.is_err());
        assert_invalid_transition(
            ledger.reject(payment.id).await,
            PaymentStatus::Cancelled,
            Transition::Reject,
        );
    }

    #[tokio::test]
    async fn test_rejected_is_terminal() {
        let ledger = ledger();
        let payment = ledger.create(new_payment(dec!(10))).await.unwrap();
        ledger.reject(payment.id).await.unwrap();

        for result in [
            ledger.approve(payment.id).await,
            ledger.reject(payment.id).await,
            ledger.cancel(payment.id).await,
        ] {
            assert!(matches!(result, Err(AppError::InvalidTransition { .. })));
        }

        let stored = ledger.get(payment.id).await.unwrap();
        assert_eq!(stored.status, PaymentStatus::Rejected);
    }

    #[tokio::test]
    async fn test_transition_unknown_payment_is_not_found() {
        let ledger = ledger();

        let result = ledger.approve(PaymentId::new()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_lost_race_is_re_evaluated() {
        let ledger = PaymentLedger::new(RacingRepo {
            inner: MockRepo::new(),
            raced: AtomicBool::new(false),
        });
        let payment = ledger.create(new_payment(dec!(10))).await.unwrap();

        let result = ledger.approve(payment.id).await;

        assert_invalid_transition(result, PaymentStatus::Cancelled, Transition::Approve);
        let stored = ledger.get(payment.id).await.unwrap();
        assert_eq!(stored.status, PaymentStatus::Cancelled);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_cancels_succeed_once() {
        let ledger = Arc::new(PaymentLedger::new(InMemoryRepo::new()));
        let payment = ledger.create(new_payment(dec!(10))).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = ledger.clone();
                tokio::spawn(async move { ledger.cancel(payment.id).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(AppError::InvalidTransition { .. }) => {}
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }

        assert_eq!(successes, 1);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries and delete
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_get_not_found() {
        let ledger = ledger();

        let result = ledger.get(PaymentId::new()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_projections() {
        let ledger = ledger();
        let a = ledger.create(new_payment(dec!(10))).await.unwrap();
        let mut other = new_payment(dec!(20));
        other.customer_tax_id = "987.654.321-00".to_string();
        other.order_ref = OrderReference::new(2002);
        other.requesting_user_id = UserId::new(8);
        ledger.create(other).await.unwrap();
        ledger.approve(a.id).await.unwrap();

        assert_eq!(ledger.list_all().await.unwrap().len(), 2);
        assert_eq!(
            ledger
                .list_by_status(PaymentStatus::Approved)
                .await
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            ledger.list_by_tax_id("987.654.321-00").await.unwrap().len(),
            1
        );
        assert_eq!(
            ledger
                .list_by_order_ref(OrderReference::new(1001))
                .await
                .unwrap()[0]
                .id,
            a.id
        );
        assert_eq!(ledger.list_by_user(UserId::new(8)).await.unwrap().len(), 1);
        assert!(ledger.list_by_user(UserId::new(9)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_bypasses_lifecycle() {
        let ledger = ledger();
        let payment = ledger.create(new_payment(dec!(10))).await.unwrap();
        ledger.reject(payment.id).await.unwrap();

        ledger.delete(payment.id).await.unwrap();

        assert!(matches!(
            ledger.get(payment.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            ledger.delete(payment.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
