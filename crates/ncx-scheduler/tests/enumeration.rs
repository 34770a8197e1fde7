use ncx_config::EngineConfig;
use ncx_core::{EnumerationOrder, LoginPair, NextPair};
use ncx_scheduler::{AttemptOutcome, CredentialCatalog, ServiceScheduler, Target};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

fn scheduler(catalog: Arc<CredentialCatalog>, order: EnumerationOrder) -> ServiceScheduler {
    ServiceScheduler::new("ssh", catalog, Arc::new(EngineConfig::with_order(order)))
}

fn drain_fresh(service: &mut ServiceScheduler) -> Vec<LoginPair> {
    let mut out = Vec::new();
    loop {
        match service.next_pair() {
            NextPair::Fresh(pair) => out.push(pair),
            NextPair::Pool(pair) => panic!("unexpected pool pair {pair}"),
            NextPair::Exhausted => return out,
        }
    }
}

fn expected(users: &[String], passwords: &[String], order: EnumerationOrder) -> Vec<LoginPair> {
    match order {
        EnumerationOrder::UsersPerPassword => passwords
            .iter()
            .flat_map(|p| users.iter().map(move |u| LoginPair::new(u, p)))
            .collect(),
        EnumerationOrder::PasswordsPerUser => users
            .iter()
            .flat_map(|u| passwords.iter().map(move |p| LoginPair::new(u, p)))
            .collect(),
    }
}

fn order_strategy() -> impl Strategy<Value = EnumerationOrder> {
    prop_oneof![
        Just(EnumerationOrder::UsersPerPassword),
        Just(EnumerationOrder::PasswordsPerUser),
    ]
}

proptest! {
    #[test]
    fn fresh_walk_covers_cross_product_exactly_once(
        users in prop::collection::vec("[a-z]{1,6}", 0..8),
        passwords in prop::collection::vec("[a-z0-9]{1,6}", 0..8),
        order in order_strategy(),
    ) {
        let catalog = Arc::new(CredentialCatalog::new(users.clone(), passwords.clone()));
        let mut service = scheduler(catalog, order);

        let walked = drain_fresh(&mut service);
        prop_assert_eq!(walked.len(), users.len() * passwords.len());
        prop_assert_eq!(&walked, &expected(&users, &passwords, order));
        prop_assert_eq!(service.next_pair(), NextPair::Exhausted);
    }

    #[test]
    fn retries_interleave_without_loss(
        users in prop::collection::vec("[a-z]{1,4}", 1..5),
        passwords in prop::collection::vec("[0-9]{1,4}", 1..5),
        interrupt_every in 1usize..4,
    ) {
        let catalog = Arc::new(CredentialCatalog::new(users.clone(), passwords.clone()));
        let mut service = scheduler(catalog, EnumerationOrder::UsersPerPassword);
        let total = users.len() * passwords.len();

        let mut resolved = Vec::new();
        let mut interrupted = HashSet::new();
        let mut step = 0usize;
        while let Some(session) = service.open_attempt() {
            step += 1;
            let pair = session.pair().cloned().unwrap();
            // Interrupt each pair at most once.
            if step % interrupt_every == 0 && interrupted.insert(pair.clone()) {
                service.close_attempt(session, AttemptOutcome::Interrupted);
            } else {
                resolved.push(pair);
                service.close_attempt(session, AttemptOutcome::Rejected);
            }
        }

        prop_assert_eq!(resolved.len(), total);
        prop_assert!(service.is_pool_empty());
        prop_assert!(service.is_mirror_pool_empty());
        prop_assert_eq!(service.counters().finished_attempts as usize, total + interrupted.len());
    }
}

#[test]
fn replicas_walk_shared_catalog_independently_on_threads() {
    let catalog = Arc::new(CredentialCatalog::new(
        ["admin", "root", "guest"],
        ["123", "pass", "toor"],
    ));
    let mut template = scheduler(Arc::clone(&catalog), EnumerationOrder::UsersPerPassword);
    template.port = 22;
    // Advance the template; replicas must not inherit this.
    template.next_pair();

    let handles: Vec<_> = ["10.0.0.1", "10.0.0.2", "10.0.0.3"]
        .into_iter()
        .map(|host| {
            let mut replica = template.replicate();
            replica.bind_target(Arc::new(Target::new(host)));
            std::thread::spawn(move || {
                let info = replica.host_info().to_string();
                (info, drain_fresh(&mut replica))
            })
        })
        .collect();

    let all = expected(
        catalog.users(),
        catalog.passwords(),
        EnumerationOrder::UsersPerPassword,
    );
    for (handle, host) in handles.into_iter().zip(["10.0.0.1", "10.0.0.2", "10.0.0.3"]) {
        let (info, walked) = handle.join().unwrap();
        assert_eq!(info, format!("ssh://{host}:22"));
        assert_eq!(walked, all);
    }
    assert_eq!(Arc::strong_count(&catalog), 2);
}
