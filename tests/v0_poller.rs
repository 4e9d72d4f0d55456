/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
mod helpers;

#[cfg(test)]
mod test {
    use crate::helpers;
    use dropbox_oauth1::v0::{ChangePoller, PollEvent, PollState, PollerConfig};
    use mockito::Matcher;
    use std::io::Write;
    use std::time::Duration;
    use tokio::time::timeout;

    fn delta_body(entries: &[&str], reset: bool, cursor: &str, has_more: bool) -> String {
        format!(
            r#"{{"entries": [{}], "reset": {reset}, "cursor": "{cursor}", "has_more": {has_more}}}"#,
            entries.join(", ")
        )
    }

    fn changed(path: &str) -> String {
        format!(r#"["{path}", {}]"#, helpers::file_json(path))
    }

    fn deleted(path: &str) -> String {
        format!(r#"["{path}", null]"#)
    }

    fn config(interval: Duration) -> PollerConfig {
        PollerConfig {
            interval,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn baseline_poll_emits_nothing_but_records_cursor() {
        helpers::init();
        let mut server = mockito::Server::new_async().await;
        // The baseline call carries no cursor, hence no query string
        let m = server
            .mock("POST", "/0/delta")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(delta_body(&[&changed("/a.txt")], true, "c1", false))
            .create_async()
            .await;

        let client = helpers::mock_client(&server, helpers::full_creds());
        let poller = ChangePoller::new(client, PollerConfig::default());
        let mut events = poller.subscribe();

        assert_eq!(poller.cursor(), None);
        let has_more = poller.poll_once().await.unwrap();
        m.assert_async().await;

        assert!(!has_more);
        assert_eq!(poller.cursor().as_deref(), Some("c1"));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn changes_are_emitted_in_server_order() {
        helpers::init();
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/0/delta")
            .match_query(Matcher::UrlEncoded("cursor".into(), "c1".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(delta_body(
                &[&changed("/b.txt"), &deleted("/old")],
                false,
                "c2",
                false,
            ))
            .create_async()
            .await;

        let client = helpers::mock_client(&server, helpers::full_creds());
        let poller = ChangePoller::new(client, PollerConfig::default()).with_cursor("c1");
        let mut events = poller.subscribe();

        poller.poll_once().await.unwrap();
        m.assert_async().await;

        match events.try_recv().unwrap() {
            PollEvent::Data(entry) => {
                assert_eq!(entry.path, "/b.txt");
                assert!(!entry.is_deleted());
            }
            other => panic!("unexpected event {other:?}"),
        }
        match events.try_recv().unwrap() {
            PollEvent::Data(entry) => {
                assert_eq!(entry.path, "/old");
                assert!(entry.is_deleted());
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(events.try_recv().is_err());
        assert_eq!(poller.cursor().as_deref(), Some("c2"));
    }

    #[tokio::test]
    async fn reset_comes_before_entries() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/0/delta")
            .match_query(Matcher::UrlEncoded("cursor".into(), "c1".into()))
            .with_status(200)
            .with_body(delta_body(
                &[&changed("/x"), &changed("/y")],
                true,
                "c2",
                false,
            ))
            .create_async()
            .await;

        let client = helpers::mock_client(&server, helpers::full_creds());
        let poller = ChangePoller::new(client, PollerConfig::default()).with_cursor("c1");
        let mut first = poller.subscribe();
        let mut second = poller.subscribe();

        poller.poll_once().await.unwrap();
        m.assert_async().await;

        for events in [&mut first, &mut second] {
            assert!(matches!(events.try_recv(), Ok(PollEvent::Reset)));
            assert!(matches!(events.try_recv(), Ok(PollEvent::Data(e)) if e.path == "/x"));
            assert!(matches!(events.try_recv(), Ok(PollEvent::Data(e)) if e.path == "/y"));
            assert!(events.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn running_poller_delivers_changes_after_baseline() {
        helpers::init();
        let mut server = mockito::Server::new_async().await;
        let baseline = server
            .mock("POST", "/0/delta")
            .with_status(200)
            .with_body(delta_body(&[&changed("/seen-before")], false, "c1", false))
            .expect(1)
            .create_async()
            .await;
        let _next = server
            .mock("POST", "/0/delta")
            .match_query(Matcher::UrlEncoded("cursor".into(), "c1".into()))
            .with_status(200)
            .with_body(delta_body(&[&changed("/new.txt")], false, "c1", false))
            .create_async()
            .await;

        let client = helpers::mock_client(&server, helpers::full_creds());
        let poller = ChangePoller::new(client, config(Duration::from_millis(50)));
        let mut events = poller.subscribe();
        poller.start().unwrap();
        assert!(poller.is_running());

        let event = timeout(Duration::from_secs(5), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, PollEvent::Data(e) if e.path == "/new.txt"));

        poller.stop();
        assert_eq!(poller.state(), PollState::Idle);
        baseline.assert_async().await;
    }

    #[tokio::test]
    async fn errors_are_emitted_and_polling_continues() {
        helpers::init();
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/0/delta")
            .with_status(500)
            .with_body(r#"{"error": "Internal Server Error"}"#)
            .expect_at_least(2)
            .create_async()
            .await;

        let client = helpers::mock_client(&server, helpers::full_creds());
        let poller = ChangePoller::new(client, config(Duration::from_millis(20)));
        let mut events = poller.subscribe();
        poller.resume().unwrap();

        for _ in 0..2 {
            let event = timeout(Duration::from_secs(5), events.recv())
                .await
                .unwrap()
                .unwrap();
            match event {
                PollEvent::Error(err) => assert_eq!(err.status(), Some(500)),
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert!(poller.is_running());
        poller.pause();
        assert!(!poller.is_running());
        assert_eq!(poller.cursor(), None);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn immediate_polls_are_bounded() {
        helpers::init();
        let mut server = mockito::Server::new_async().await;
        let baseline = server
            .mock("POST", "/0/delta")
            .with_status(200)
            .with_body(delta_body(&[&changed("/a")], false, "c1", true))
            .expect(1)
            .create_async()
            .await;
        let more = server
            .mock("POST", "/0/delta")
            .match_query(Matcher::UrlEncoded("cursor".into(), "c1".into()))
            .with_status(200)
            .with_body(delta_body(&[&changed("/b")], false, "c1", true))
            .expect(3)
            .create_async()
            .await;

        let client = helpers::mock_client(&server, helpers::full_creds());
        let poller = ChangePoller::new(
            client,
            PollerConfig {
                interval: Duration::from_secs(3600),
                max_immediate_polls: 3,
                ..Default::default()
            },
        );
        let mut events = poller.subscribe();
        poller.start().unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        poller.stop();

        baseline.assert_async().await;
        more.assert_async().await;
        // Every page belonged to the still draining baseline
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn pause_drops_the_in_flight_result() {
        helpers::init();
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/0/delta")
            .match_query(Matcher::UrlEncoded("cursor".into(), "c1".into()))
            .with_status(200)
            .with_chunked_body(|w| {
                // Answer only once the poller has been paused
                std::thread::sleep(Duration::from_millis(400));
                w.write_all(delta_body(&[&changed("/late.txt")], true, "c2", false).as_bytes())
            })
            .expect(1)
            .create_async()
            .await;

        let client = helpers::mock_client(&server, helpers::full_creds());
        let poller =
            ChangePoller::new(client, config(Duration::from_millis(20))).with_cursor("c1");
        let mut events = poller.subscribe();
        poller.start().unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        poller.pause();
        assert_eq!(poller.state(), PollState::Idle);

        // Long enough for the response to land and for a rearmed timer to fire
        tokio::time::sleep(Duration::from_millis(800)).await;
        m.assert_async().await;
        assert!(events.try_recv().is_err());
        assert_eq!(poller.cursor().as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn resume_while_running_polls_again_right_away() {
        helpers::init();
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/0/delta")
            .match_query(Matcher::UrlEncoded("cursor".into(), "c1".into()))
            .with_status(200)
            .with_body(delta_body(&[&changed("/again.txt")], false, "c1", false))
            .expect(2)
            .create_async()
            .await;

        let client = helpers::mock_client(&server, helpers::full_creds());
        // The interval alone would never trigger a second poll here
        let poller =
            ChangePoller::new(client, config(Duration::from_secs(3600))).with_cursor("c1");
        let mut events = poller.subscribe();

        poller.start().unwrap();
        let first = timeout(Duration::from_secs(5), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(first, PollEvent::Data(e) if e.path == "/again.txt"));

        poller.resume().unwrap();
        assert!(poller.is_running());
        let second = timeout(Duration::from_secs(5), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(second, PollEvent::Data(e) if e.path == "/again.txt"));

        poller.stop();
        m.assert_async().await;
    }
}
