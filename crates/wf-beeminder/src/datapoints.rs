//! Live datapoint endpoints.

use wf_core::Datapoint;

use crate::error::FeedError;
use crate::feed::{DatapointFeed, DatapointUpdate, NewDatapoint};
use crate::http::{check_create_response, check_response};
use crate::BeeminderClient;

/// Decode one listing page.
fn parse_page(body: &str, request: &str) -> Result<Vec<Datapoint>, FeedError> {
    serde_json::from_str(body).map_err(|e| FeedError::Parse(format!("{request}: {e}")))
}

fn parse_one(body: &str, request: &str) -> Result<Datapoint, FeedError> {
    serde_json::from_str(body).map_err(|e| FeedError::Parse(format!("{request}: {e}")))
}

impl BeeminderClient {
    fn auth_form(&self) -> Vec<(&'static str, String)> {
        vec![("auth_token", self.auth_token.clone())]
    }
}

impl DatapointFeed for BeeminderClient {
    /// Walk the listing newest-first until a short or empty page.
    async fn fetch_all(&self, goal: &str) -> Result<Vec<Datapoint>, FeedError> {
        let url = self.goal_url(goal);
        let per_page = self.per_page.to_string();
        let mut all = Vec::new();
        let mut page: u32 = 1;

        loop {
            let request = format!("GET {goal} page {page}");
            let page_str = page.to_string();
            let resp = self
                .http
                .get(&url)
                .query(&[
                    ("auth_token", self.auth_token.as_str()),
                    ("sort", "desc"),
                    ("page", page_str.as_str()),
                    ("per_page", per_page.as_str()),
                ])
                .send()
                .await?;
            let body = check_response(resp, &request).await?.text().await?;
            let batch = parse_page(&body, &request)?;
            let len = batch.len();
            tracing::debug!(goal, page, count = len, "fetched datapoint page");
            all.extend(batch);

            if len == 0 || len < self.per_page as usize {
                break;
            }
            page += 1;
        }

        tracing::info!(goal, total = all.len(), "fetched datapoints");
        Ok(all)
    }

    async fn create(&self, goal: &str, datapoint: &NewDatapoint) -> Result<Datapoint, FeedError> {
        let request = format!("POST {goal} {}", datapoint.daystamp);
        let mut form = self.auth_form();
        form.push(("value", datapoint.value.to_string()));
        form.push(("comment", datapoint.comment.clone()));
        form.push(("daystamp", datapoint.daystamp.to_string()));
        if let Some(requestid) = &datapoint.requestid {
            form.push(("requestid", requestid.clone()));
        }

        let resp = self.http.post(self.goal_url(goal)).form(&form).send().await?;
        let body = check_create_response(resp, &request, datapoint.requestid.as_deref())
            .await?
            .text()
            .await?;
        parse_one(&body, &request)
    }

    async fn update(
        &self,
        goal: &str,
        id: &str,
        update: &DatapointUpdate,
    ) -> Result<Datapoint, FeedError> {
        let request = format!("PUT {goal} {id}");
        let mut form = self.auth_form();
        form.push(("value", update.value.to_string()));
        form.push(("comment", update.comment.clone()));
        if let Some(daystamp) = update.daystamp {
            form.push(("daystamp", daystamp.to_string()));
        }

        let resp = self
            .http
            .put(self.datapoint_url(goal, id))
            .form(&form)
            .send()
            .await?;
        let body = check_response(resp, &request).await?.text().await?;
        parse_one(&body, &request)
    }

    async fn delete(&self, goal: &str, id: &str) -> Result<(), FeedError> {
        let request = format!("DELETE {goal} {id}");
        let resp = self
            .http
            .delete(self.datapoint_url(goal, id))
            .query(&[("auth_token", self.auth_token.as_str())])
            .send()
            .await?;
        check_response(resp, &request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"[
        {
            "id": "a1",
            "timestamp": 1735740000,
            "daystamp": "20250101",
            "value": 1,
            "comment": "50 minutes session at 8:00",
            "updated_at": 1735745000
        },
        {
            "id": "a2",
            "timestamp": 1735653600,
            "daystamp": "20241231",
            "value": 1,
            "comment": "25 minutes session at 9:30"
        }
    ]"#;

    #[test]
    fn parses_listing_page() {
        let dps = parse_page(PAGE, "GET focusmate page 1").unwrap();
        assert_eq!(dps.len(), 2);
        assert_eq!(dps[0].remote_id(), Some("a1"));
        assert_eq!(dps[1].daystamp.as_deref(), Some("20241231"));
    }

    #[test]
    fn empty_page_parses() {
        assert!(parse_page("[]", "GET focusmate page 3").unwrap().is_empty());
    }

    #[test]
    fn malformed_page_is_parse_error_with_context() {
        let err = parse_page(r#"{"errors":"nope"}"#, "GET focusmate page 2").unwrap_err();
        match err {
            FeedError::Parse(msg) => assert!(msg.starts_with("GET focusmate page 2")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parses_single_datapoint() {
        let dp = parse_one(
            r#"{"id":"x","value":0,"comment":"Auto: SoT=0 for 20250101 (≥50m by 09:15 check).","requestid":"wakeandfocus-20250101-sot-v1"}"#,
            "POST wakeandfocus 20250101",
        )
        .unwrap();
        assert_eq!(dp.remote_id(), Some("x"));
        assert_eq!(dp.rounded_value(), 0);
    }

    mod paging {
        use std::sync::{Arc, Mutex};

        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;
        use wf_config::BeeminderConfig;
        use wf_core::Datapoint;

        use crate::BeeminderClient;
        use crate::feed::DatapointFeed;

        fn page_of(ids: &[&str]) -> String {
            let items: Vec<String> = ids
                .iter()
                .map(|id| format!(r#"{{"id":"{id}","daystamp":"20250101","value":1}}"#))
                .collect();
            format!("[{}]", items.join(","))
        }

        /// Serve one canned body per connection, recording each request line.
        async fn serve_pages(pages: Vec<String>) -> (String, Arc<Mutex<Vec<String>>>) {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let seen = Arc::new(Mutex::new(Vec::new()));
            let log = Arc::clone(&seen);

            tokio::spawn(async move {
                for body in pages {
                    let (mut socket, _) = listener.accept().await.unwrap();
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        let n = socket.read(&mut chunk).await.unwrap();
                        if n == 0 {
                            break;
                        }
                        buf.extend_from_slice(&chunk[..n]);
                    }
                    let head = String::from_utf8_lossy(&buf);
                    let line = head.lines().next().unwrap_or_default().to_string();
                    log.lock().unwrap().push(line);

                    let resp = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    socket.write_all(resp.as_bytes()).await.unwrap();
                    socket.shutdown().await.unwrap();
                }
            });

            (format!("http://{addr}/api/v1"), seen)
        }

        fn client(base_url: String) -> BeeminderClient {
            BeeminderClient::new(&BeeminderConfig {
                base_url,
                username: "alice".into(),
                auth_token: "t".into(),
                per_page: 2,
                ..BeeminderConfig::default()
            })
            .unwrap()
        }

        fn ids(dps: &[Datapoint]) -> Vec<&str> {
            dps.iter().filter_map(Datapoint::remote_id).collect()
        }

        #[tokio::test]
        async fn short_page_ends_the_walk() {
            let (base, seen) = serve_pages(vec![
                page_of(&["a", "b"]),
                page_of(&["c", "d"]),
                page_of(&["e"]),
            ])
            .await;

            let dps = client(base).fetch_all("focusmate").await.unwrap();

            assert_eq!(ids(&dps), vec!["a", "b", "c", "d", "e"]);
            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 3);
            for (i, line) in seen.iter().enumerate() {
                assert!(line.starts_with("GET /api/v1/users/alice/goals/focusmate/datapoints.json?"));
                assert!(line.contains(&format!("&page={}&", i + 1)), "{line}");
                assert!(line.contains("per_page=2"), "{line}");
                assert!(line.contains("sort=desc"), "{line}");
            }
        }

        #[tokio::test]
        async fn empty_page_after_full_pages_ends_the_walk() {
            let (base, seen) = serve_pages(vec![
                page_of(&["a", "b"]),
                page_of(&["c", "d"]),
                "[]".to_string(),
            ])
            .await;

            let dps = client(base).fetch_all("focusmate").await.unwrap();

            assert_eq!(ids(&dps), vec!["a", "b", "c", "d"]);
            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 3);
            assert!(seen[2].contains("&page=3&"), "{}", seen[2]);
        }
    }
}
