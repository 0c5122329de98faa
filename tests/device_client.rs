// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the device client against an in-memory device.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use common::{MockConnector, MockDevice, settle};
use parking_lot::Mutex;
use screenbar_lib::client::{ClientConfig, DeviceClient, PollOutcome, RetryPolicy, SetOptions, SetOutcome};
use screenbar_lib::error::{Error, TransportError};
use screenbar_lib::protocol::GET_PROP;
use screenbar_lib::state::DeviceStatus;
use screenbar_lib::types::{CharacteristicValue, PropertyValue};
use serde_json::json;

fn client_for(device: &MockDevice, keys: &[&str]) -> DeviceClient<MockConnector> {
    client_with(device, ClientConfig::new("10.0.0.2", "token", keys.iter().copied()))
}

fn client_with(device: &MockDevice, config: ClientConfig) -> DeviceClient<MockConnector> {
    DeviceClient::new(Arc::new(device.connector()), config)
}

fn snapshot(pairs: &[(&str, PropertyValue)]) -> DeviceStatus {
    pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
}

// ============================================================================
// Connection
// ============================================================================

mod connection {
    use super::*;

    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Counts ERROR events.
    struct ErrorCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for ErrorCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_connected() {
        let errors = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(ErrorCounter(Arc::clone(&errors)));
        let _guard = tracing::subscriber::set_default(subscriber);

        let device = MockDevice::new();
        device.fail_connects(2);
        let client = client_for(&device, &["bright"]);

        client.connection().await.unwrap();

        let attempts = device.connect_attempts();
        assert_eq!(attempts.len(), 3);
        assert_eq!(attempts[1] - attempts[0], Duration::from_secs(3));
        assert_eq!(attempts[2] - attempts[1], Duration::from_secs(3));
        assert_eq!(errors.load(Ordering::SeqCst), 2);
        assert!(client.is_connected());

        client.connection().await.unwrap();
        assert_eq!(device.connect_attempts().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_attempt() {
        let device = MockDevice::new();
        device.fail_connects(1);
        let client = client_for(&device, &["bright"]);

        let first = tokio::spawn({
            let client = client.clone();
            async move { client.connection().await.map(|_| ()) }
        });
        let second = tokio::spawn({
            let client = client.clone();
            async move { client.connection().await.map(|_| ()) }
        });

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        assert_eq!(device.connect_attempts().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn connected_callback_fires_once() {
        let device = MockDevice::new();
        let client = client_for(&device, &["bright"]);
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        client.on_connected(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        client.connection().await.unwrap();
        client.connection().await.unwrap();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_policy_gives_up_and_next_call_retries() {
        let device = MockDevice::new();
        device.fail_connects(2);
        let client = client_with(
            &device,
            ClientConfig::new("10.0.0.2", "token", ["bright"])
                .with_retry_policy(RetryPolicy::new().with_max_retries(0)),
        );

        let err = client.connection().await.unwrap_err();
        assert!(matches!(err, Error::Connection(TransportError::ConnectionFailed(_))));
        assert!(!client.is_connected());

        assert!(client.connection().await.is_err());
        client.connection().await.unwrap();
        assert_eq!(device.connect_attempts().len(), 3);
    }
}

// ============================================================================
// Polling
// ============================================================================

mod polling {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn poll_replaces_cache_wholesale() {
        let device = MockDevice::new();
        device.set_property("bright", "10");
        device.set_property("ct", "2700");
        let client = client_for(&device, &["bright", "ct"]);

        client.refresh().await;
        device.set_property("bright", "20");
        device.remove_property("ct");
        client.refresh().await;

        let status = client.status().unwrap();
        assert_eq!(
            *status,
            snapshot(&[("bright", json!("20")), ("ct", PropertyValue::Null)])
        );
    }

    #[tokio::test(start_paused = true)]
    async fn short_reply_fills_missing_keys() {
        let device = MockDevice::new();
        device.script_reply(GET_PROP, Ok(vec![json!("on")]));
        let client = client_for(&device, &["main_power", "bright"]);

        client.refresh().await;

        let status = client.status().unwrap();
        assert_eq!(status.get("main_power"), Some(&json!("on")));
        assert_eq!(status.get("bright"), Some(&PropertyValue::Null));
    }

    #[tokio::test(start_paused = true)]
    async fn change_detection() {
        let device = MockDevice::new();
        device.set_property("a", "1");
        device.set_property("b", "2");
        let client = client_for(&device, &["a", "b"]);

        let notified = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&notified);
        client.on_status_changed(move |change, _| {
            let keys: Vec<String> = change.iter().map(|(k, _)| k.to_string()).collect();
            sink.lock().push(keys);
        });

        let PollOutcome::Updated(first) = client.refresh().await else {
            panic!("first poll should update");
        };
        assert_eq!(first.len(), 2);
        assert_eq!(first.get("a"), Some(&json!("1")));
        assert_eq!(first.get("b"), Some(&json!("2")));

        device.set_property("b", "3");
        let PollOutcome::Updated(second) = client.refresh().await else {
            panic!("second poll should update");
        };
        assert_eq!(second.len(), 1);
        assert_eq!(second.get("b"), Some(&json!("3")));

        assert_eq!(
            *notified.lock(),
            vec![vec!["a".to_string(), "b".to_string()], vec!["b".to_string()]]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_poll_is_skipped() {
        let device = MockDevice::new();
        device.set_property("bright", "10");
        device.delay(GET_PROP, Duration::from_secs(1));
        let client = client_for(&device, &["bright"]);

        let first = tokio::spawn({
            let client = client.clone();
            async move { client.refresh().await }
        });
        settle().await;

        assert_eq!(client.refresh().await, PollOutcome::Skipped);
        assert!(client.status().is_none());
        assert_eq!(device.calls_to(GET_PROP).len(), 1);

        assert!(matches!(first.await.unwrap(), PollOutcome::Updated(_)));
        assert!(client.status().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_poll_keeps_previous_status() {
        let device = MockDevice::new();
        device.set_property("bright", "10");
        let client = client_for(&device, &["bright"]);
        client.refresh().await;

        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);
        client.on_status_changed(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        device.set_property("bright", "99");
        device.script_reply(GET_PROP, Err(TransportError::CallFailed("timeout".to_string())));

        assert_eq!(client.refresh().await, PollOutcome::Failed);
        assert_eq!(client.status().unwrap().get("bright"), Some(&json!("10")));
        assert_eq!(notified.load(Ordering::SeqCst), 0);

        assert!(matches!(client.refresh().await, PollOutcome::Updated(_)));
        assert_eq!(client.status().unwrap().get("bright"), Some(&json!("99")));
    }

    #[tokio::test(start_paused = true)]
    async fn loop_polls_every_interval() {
        let device = MockDevice::new();
        device.set_property("bright", "10");
        let client = client_for(&device, &["bright"]);

        client.start_polling();
        client.start_polling();
        assert!(client.is_polling());

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(device.calls_to(GET_PROP).len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_is_measured_from_end_of_poll() {
        let device = MockDevice::new();
        device.delay(GET_PROP, Duration::from_secs(2));
        let client = client_with(
            &device,
            ClientConfig::new("10.0.0.2", "token", ["bright"]).with_poll_interval(Duration::from_secs(5)),
        );

        client.start_polling();

        // Polls start at 0s and 7s.
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(device.calls_to(GET_PROP).len(), 1);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(device.calls_to(GET_PROP).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_stops_when_client_dropped() {
        let device = MockDevice::new();
        let client = client_for(&device, &["bright"]);

        client.start_polling();
        settle().await;
        assert_eq!(device.calls_to(GET_PROP).len(), 1);

        drop(client);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(device.calls_to(GET_PROP).len(), 1);
    }
}

// ============================================================================
// Getters
// ============================================================================

mod getters {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn stale_before_first_poll_then_cached() {
        let device = MockDevice::new();
        device.set_property("bright", "75");
        let client = client_for(&device, &["bright"]);
        let getter = client.map_get("getBrightness", |status| {
            Ok(CharacteristicValue::number(status.number("bright")?))
        });

        assert!(matches!(getter.get(), Err(Error::StaleData)));
        assert!(device.calls().is_empty());

        client.refresh().await;
        let calls = device.calls().len();

        assert_eq!(getter.get().unwrap(), CharacteristicValue::Int(75));
        assert_eq!(getter.get().unwrap(), CharacteristicValue::Int(75));
        assert_eq!(device.calls().len(), calls);
    }
}

// ============================================================================
// Setters
// ============================================================================

mod setters {
    use super::*;

    async fn polled_client(device: &MockDevice) -> DeviceClient<MockConnector> {
        device.set_property("main_power", "on");
        device.set_property("bright", "10");
        let client = client_for(device, &["main_power", "bright"]);
        client.refresh().await;
        client
    }

    fn bright_setter(client: &DeviceClient<MockConnector>, options: SetOptions) -> screenbar_lib::client::Setter<MockConnector> {
        client.map_set(
            "setBrightness",
            "set_bright",
            |value, _| Ok(json!(value.as_f64()?)),
            options,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn scalar_argument_is_wrapped() {
        let device = MockDevice::new();
        let client = polled_client(&device).await;
        let setter = client.map_set("setPower", "set_power", |_, _| Ok(json!("off")), SetOptions::new());

        assert_eq!(setter.set(false.into()).await.unwrap(), SetOutcome::Applied);
        assert_eq!(device.calls_to("set_power"), vec![vec![json!("off")]]);
    }

    #[tokio::test(start_paused = true)]
    async fn check_false_short_circuits() {
        let device = MockDevice::new();
        let client = polled_client(&device).await;
        let before = client.status().unwrap();
        let setter = bright_setter(&client, SetOptions::new().check(|_, _| false));

        assert_eq!(setter.set(50.into()).await.unwrap(), SetOutcome::Skipped);
        assert!(device.calls_to("set_bright").is_empty());
        assert_eq!(client.status().unwrap(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn update_replaces_cache() {
        let device = MockDevice::new();
        let client = polled_client(&device).await;
        let setter = bright_setter(
            &client,
            SetOptions::new().update(|value, _, status| status.with("bright", value.to_string())),
        );

        setter.set(50.into()).await.unwrap();

        assert_eq!(
            *client.status().unwrap(),
            snapshot(&[("main_power", json!("on")), ("bright", json!("50"))])
        );
    }

    #[tokio::test(start_paused = true)]
    async fn hooks_run_in_order() {
        let device = MockDevice::new();
        let client = polled_client(&device).await;
        let trace = Arc::new(Mutex::new(Vec::new()));

        let (t1, t2, t3, t4) = (
            Arc::clone(&trace),
            Arc::clone(&trace),
            Arc::clone(&trace),
            Arc::clone(&trace),
        );
        let setter = bright_setter(
            &client,
            SetOptions::new()
                .before(move |_, _| {
                    t1.lock().push("before");
                    Ok(())
                })
                .check(move |_, _| {
                    t2.lock().push("check");
                    true
                })
                .update(move |_, _, status| {
                    t3.lock().push("update");
                    status.clone()
                })
                .after(move |_, _| {
                    t4.lock().push("after");
                    Ok(())
                }),
        );

        setter.set(20.into()).await.unwrap();
        assert_eq!(*trace.lock(), vec!["before", "check", "update", "after"]);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_command_leaves_cache() {
        let device = MockDevice::new();
        let client = polled_client(&device).await;
        device.script_reply("set_bright", Ok(vec![json!("invalid params")]));

        let after_ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&after_ran);
        let setter = bright_setter(
            &client,
            SetOptions::new()
                .update(|_, _, status| status.with("bright", "99"))
                .after(move |_, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
        );

        let err = setter.set(99.into()).await.unwrap_err();
        assert!(matches!(err, Error::CommandRejected(ref m) if m == "invalid params"));
        assert_eq!(client.status().unwrap().get("bright"), Some(&json!("10")));
        assert_eq!(after_ran.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn transformer_error_skips_call() {
        let device = MockDevice::new();
        let client = polled_client(&device).await;
        let setter = bright_setter(&client, SetOptions::new());

        let err = setter.set(true.into()).await.unwrap_err();
        assert!(matches!(err, Error::Value(_)));
        assert!(device.calls_to("set_bright").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn before_error_short_circuits() {
        let device = MockDevice::new();
        let client = polled_client(&device).await;
        let setter = bright_setter(
            &client,
            SetOptions::new().before(|_, _| Err(Error::transform("not allowed"))),
        );

        let err = setter.set(30.into()).await.unwrap_err();
        assert!(matches!(err, Error::Transform(ref m) if m == "not allowed"));
        assert!(device.calls_to("set_bright").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_runs_only_the_last_call() {
        let device = MockDevice::new();
        let client = polled_client(&device).await;
        let setter = bright_setter(&client, SetOptions::new().debounce(Duration::from_millis(150)));

        let outcomes = tokio::join!(
            setter.set(10.into()),
            setter.set(20.into()),
            setter.set(30.into()),
            setter.set(40.into()),
        );

        assert_eq!(outcomes.0.unwrap(), SetOutcome::Superseded);
        assert_eq!(outcomes.1.unwrap(), SetOutcome::Superseded);
        assert_eq!(outcomes.2.unwrap(), SetOutcome::Superseded);
        assert_eq!(outcomes.3.unwrap(), SetOutcome::Applied);
        assert_eq!(device.calls_to("set_bright"), vec![vec![json!(40.0)]]);
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_window_restarts_on_each_call() {
        let device = MockDevice::new();
        let client = polled_client(&device).await;
        let setter = bright_setter(&client, SetOptions::new().debounce(Duration::from_millis(150)));
        let start = tokio::time::Instant::now();

        let (first, second) = tokio::join!(setter.set(10.into()), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let outcome = setter.set(20.into()).await;
            (outcome, start.elapsed())
        });

        assert_eq!(first.unwrap(), SetOutcome::Superseded);
        assert_eq!(second.0.unwrap(), SetOutcome::Applied);
        assert_eq!(second.1, Duration::from_millis(250));
        assert_eq!(device.calls_to("set_bright").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn setters_debounce_independently() {
        let device = MockDevice::new();
        let client = polled_client(&device).await;
        let options = SetOptions::new().debounce(Duration::from_millis(150));
        let bright = bright_setter(&client, options.clone());
        let power = client.map_set("setPower", "set_power", |_, _| Ok(json!(["on"])), options);

        let (a, b) = tokio::join!(bright.set(10.into()), power.set(true.into()));

        assert_eq!(a.unwrap(), SetOutcome::Applied);
        assert_eq!(b.unwrap(), SetOutcome::Applied);
    }

    #[tokio::test(start_paused = true)]
    async fn rpc_timeout() {
        let device = MockDevice::new();
        device.delay("set_bright", Duration::from_secs(30));
        let client = client_with(
            &device,
            ClientConfig::new("10.0.0.2", "token", ["bright"]).with_rpc_timeout(Duration::from_secs(2)),
        );
        let setter = bright_setter(&client, SetOptions::new());

        let err = setter.set(10.into()).await.unwrap_err();
        assert!(matches!(err, Error::Timeout(2000)));
    }

    #[tokio::test(start_paused = true)]
    async fn set_before_first_poll_sees_no_status() {
        let device = MockDevice::new();
        let client = client_for(&device, &["bright"]);
        let setter = bright_setter(
            &client,
            SetOptions::new()
                .check(|_, status| status.is_none())
                .update(|_, _, status| status.with("bright", "1")),
        );

        assert_eq!(setter.set(10.into()).await.unwrap(), SetOutcome::Applied);
        assert!(client.status().is_none());
    }
}
