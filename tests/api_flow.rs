//! End-to-end flows against a scripted transport.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http::Method;

use osm_client::{
    Bounds, ClientConfig, Element, ElementRef, NoteAction, NoteStatus, OsmClient, OsmError,
    Result, Tags, Transport,
};

#[derive(Debug, Clone, PartialEq)]
struct RecordedRequest {
    method: String,
    url: String,
    body: Option<String>,
    authenticated: bool,
}

/// Scripted network double: responses are consumed in push order, every
/// request is recorded.
#[derive(Default)]
struct MockTransport {
    responses: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    fn new() -> Arc<Self> {
        Arc::new(MockTransport::default())
    }

    fn push_ok(&self, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(body.to_string()));
    }

    fn push_err(&self, status: u16, status_text: &str, message: &str) {
        self.responses.lock().unwrap().push_back(Err(OsmError::Http {
            message: message.to_string(),
            status,
            status_text: status_text.to_string(),
        }));
    }

    fn record(
        &self,
        method: &str,
        url: &str,
        body: Option<String>,
        authenticated: bool,
    ) -> Result<String> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            body,
            authenticated,
        });
        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(OsmError::Http {
                message: "mock transport ran out of responses".to_string(),
                status: 0,
                status_text: String::new(),
            })
        })
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<String> {
        self.record("GET", url, None, false)
    }

    async fn get_auth(&self, url: &str) -> Result<String> {
        self.record("GET", url, None, true)
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
        _content_type: Option<&str>,
    ) -> Result<String> {
        self.record(method.as_str(), url, body, true)
    }
}

fn client_over(transport: &Arc<MockTransport>) -> OsmClient {
    let config = ClientConfig::default().with_endpoint("https://api.test/api/0.6");
    let transport: Arc<dyn Transport> = transport.clone();
    OsmClient::with_transport(transport, config).unwrap()
}

#[tokio::test]
async fn fetch_element_mutate_and_send() {
    let transport = MockTransport::new();
    transport.push_ok(
        "<osm><node id=\"3718\" visible=\"true\" version=\"6\" changeset=\"89\" \
         lat=\"44.48\" lon=\"0.18\"><tag k=\"name\" v=\"old\"/></node></osm>",
    );
    transport.push_ok("7");
    let client = client_over(&transport);

    let fetched = client
        .fetch_element(&"node/3718".parse::<ElementRef>().unwrap())
        .await
        .unwrap();
    assert_eq!(fetched.version, Some(6));
    assert_eq!(fetched.tags().get("name"), Some("old"));

    let edited = fetched.set_tag("name", "new");
    // The fetched value is untouched by the mutation.
    assert_eq!(fetched.tags().get("name"), Some("old"));

    let sent = client.send_element(&edited, 90).await.unwrap();
    assert_eq!(sent.version, Some(7));
    assert_eq!(sent.changeset, Some(90));
    // And untouched by the send as well.
    assert_eq!(edited.version, Some(6));
    assert_eq!(edited.changeset, Some(89));

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].url, "https://api.test/api/0.6/node/3718");
    assert!(!requests[0].authenticated);
    assert_eq!(requests[1].method, "PUT");
    assert_eq!(requests[1].url, "https://api.test/api/0.6/node/3718");
    let body = requests[1].body.clone().unwrap();
    assert!(body.contains("changeset=\"90\""));
    assert!(body.contains("k=\"name\" v=\"new\""));
}

#[tokio::test]
async fn create_element_assigns_identity() {
    let transport = MockTransport::new();
    transport.push_ok("4242");
    let client = client_over(&transport);

    let local = Element::node(1.234, -0.456).set_tag("aze", "rty");
    let created = client.send_element(&local, 55).await.unwrap();

    assert_eq!(created.id, Some(4242));
    assert_eq!(created.version, Some(1));
    assert_eq!(created.changeset, Some(55));
    assert_eq!(local.id, None);

    let requests = transport.requests();
    assert_eq!(requests[0].method, "PUT");
    assert_eq!(requests[0].url, "https://api.test/api/0.6/node/create");
    let body = requests[0].body.clone().unwrap();
    assert!(body.contains("lat=\"1.234\""));
    assert!(body.contains("lon=\"-0.456\""));
    assert!(!body.contains("id="));
}

#[tokio::test]
async fn delete_element_marks_invisible() {
    let transport = MockTransport::new();
    transport.push_ok("8");
    let client = client_over(&transport);

    let node = Element::node(1.0, 2.0).with_id(99).set_version(7);
    let deleted = client.delete_element(&node, 60).await.unwrap();

    assert_eq!(deleted.visible, Some(false));
    assert_eq!(deleted.version, Some(8));
    assert_eq!(node.visible, None);

    let requests = transport.requests();
    assert_eq!(requests[0].method, "DELETE");
    assert_eq!(requests[0].url, "https://api.test/api/0.6/node/99");
}

#[tokio::test]
async fn changeset_lifecycle() {
    let transport = MockTransport::new();
    transport.push_ok("1234");
    transport.push_ok(
        "<osm><changeset id=\"1234\" open=\"true\" comments_count=\"0\" changes_count=\"0\">\
         <tag k=\"created_by\" v=\"osm-client\"/><tag k=\"comment\" v=\"better\"/>\
         <tag k=\"source\" v=\"survey\"/></changeset></osm>",
    );
    transport.push_ok("<osm><changeset id=\"1234\" open=\"true\"/></osm>");
    transport.push_ok("<diffResult generator=\"test\"/>");
    transport.push_ok("");
    transport.push_ok("<osm><changeset id=\"1234\" open=\"false\"/></osm>");
    let client = client_over(&transport);

    let id = client
        .create_changeset("osm-client", "initial", &Tags::new())
        .await
        .unwrap();
    assert_eq!(id, 1234);

    let updated = client
        .update_changeset_tags(id, "osm-client", "better", &Tags::from([("source", "survey")]))
        .await
        .unwrap();
    assert!(updated.open);
    assert_eq!(updated.tags.get("source"), Some("survey"));

    assert_eq!(client.is_changeset_still_open(id).await.unwrap(), id);

    let diff = client.upload_changeset(id, "<osmChange/>").await.unwrap();
    assert_eq!(diff, "<diffResult generator=\"test\"/>");

    client.close_changeset(id).await.unwrap();

    match client.is_changeset_still_open(id).await {
        Err(OsmError::ChangesetClosed(1234)) => {}
        other => panic!("expected ChangesetClosed, got {other:?}"),
    }

    let requests = transport.requests();
    assert_eq!(requests[0].method, "PUT");
    assert_eq!(requests[0].url, "https://api.test/api/0.6/changeset/create");
    let create_body = requests[0].body.clone().unwrap();
    assert!(create_body.contains("k=\"created_by\" v=\"osm-client\""));
    assert!(create_body.contains("k=\"comment\" v=\"initial\""));
    assert_eq!(requests[3].method, "POST");
    assert_eq!(
        requests[3].url,
        "https://api.test/api/0.6/changeset/1234/upload"
    );
    assert_eq!(requests[3].body.as_deref(), Some("<osmChange/>"));
    assert_eq!(
        requests[4].url,
        "https://api.test/api/0.6/changeset/1234/close"
    );
    // Openness checks always re-fetch under the authenticated identity.
    assert!(requests[2].authenticated);
    assert!(requests[5].authenticated);
}

#[tokio::test]
async fn changeset_update_rejection_propagates() {
    let transport = MockTransport::new();
    transport.push_err(409, "Conflict", "The changeset 1234 was closed");
    let client = client_over(&transport);

    match client
        .update_changeset_tags(1234, "osm-client", "too late", &Tags::new())
        .await
    {
        Err(err @ OsmError::Http { status: 409, .. }) => assert!(err.is_client_error()),
        other => panic!("expected HTTP 409, got {other:?}"),
    }
}

#[tokio::test]
async fn still_open_check_surfaces_transport_failures() {
    let transport = MockTransport::new();
    transport.push_err(500, "Internal Server Error", "boom");
    let client = client_over(&transport);

    match client.is_changeset_still_open(1).await {
        Err(OsmError::Http { status: 500, .. }) => {}
        other => panic!("expected HTTP 500, got {other:?}"),
    }
}

#[tokio::test]
async fn note_fixture_round_trip() {
    let transport = MockTransport::new();
    transport.push_ok(
        "<osm><note lon=\"0.18\" lat=\"44.48\"><id>1270165</id><status>closed</status>\
         <comments><comment><date>2018-01-16 15:28:34 UTC</date><action>opened</action>\
         <text>carrefour market</text></comment></comments></note></osm>",
    );
    let client = client_over(&transport);

    let note = client.fetch_note(1270165).await.unwrap();
    assert_eq!(note.id, 1270165);
    assert_eq!(note.status, NoteStatus::Closed);
    assert_eq!(note.comments.len(), 1);
    assert_eq!(note.comments[0].action, NoteAction::Opened);
    assert_eq!(note.comments[0].text.as_deref(), Some("carrefour market"));
}

#[tokio::test]
async fn notes_by_bbox_builds_query() {
    let transport = MockTransport::new();
    transport.push_ok("<osm/>");
    let client = client_over(&transport);

    let bounds = Bounds::new(44.0, -0.5, 44.5, 0.25);
    let notes = client.fetch_notes(&bounds, Some(50), None).await.unwrap();
    assert!(notes.is_empty());

    let requests = transport.requests();
    assert_eq!(
        requests[0].url,
        "https://api.test/api/0.6/notes?bbox=-0.5%2C44%2C0.25%2C44.5&limit=50"
    );
}

#[tokio::test]
async fn preferences_round_trip() {
    let transport = MockTransport::new();
    transport.push_ok(
        "<osm><preferences><preference k=\"gps.trace.visibility\" v=\"public\"/></preferences></osm>",
    );
    transport.push_ok("");
    transport.push_ok("");
    let client = client_over(&transport);

    let preferences = client.get_user_preferences().await.unwrap();
    assert_eq!(
        preferences.get("gps.trace.visibility").map(String::as_str),
        Some("public")
    );

    client
        .set_user_preference("gps.trace.visibility", "identifiable")
        .await
        .unwrap();
    client
        .delete_user_preference("gps.trace.visibility")
        .await
        .unwrap();

    let requests = transport.requests();
    assert!(requests[0].authenticated);
    assert_eq!(requests[1].method, "PUT");
    assert_eq!(
        requests[1].url,
        "https://api.test/api/0.6/user/preferences/gps.trace.visibility"
    );
    assert_eq!(requests[1].body.as_deref(), Some("identifiable"));
    assert_eq!(requests[2].method, "DELETE");
}

#[tokio::test]
async fn multi_fetch_and_relations() {
    let transport = MockTransport::new();
    transport.push_ok(
        "<osm><node id=\"1\" lat=\"0\" lon=\"0\"/><node id=\"2\" lat=\"1\" lon=\"1\"/></osm>",
    );
    transport.push_ok(
        "<osm><relation id=\"9\"><member type=\"node\" ref=\"1\" role=\"stop\"/></relation></osm>",
    );
    let client = client_over(&transport);

    let nodes = client
        .fetch_elements(osm_client::ElementKind::Node, &[1, 2])
        .await
        .unwrap();
    assert_eq!(nodes.len(), 2);

    let relations = client
        .fetch_relations_for_element(&ElementRef::node(1))
        .await
        .unwrap();
    assert_eq!(relations.len(), 1);
    assert_eq!(relations[0].members().unwrap()[0].role.as_deref(), Some("stop"));

    let requests = transport.requests();
    assert_eq!(
        requests[0].url,
        "https://api.test/api/0.6/nodes?nodes=1%2C2"
    );
    assert_eq!(requests[1].url, "https://api.test/api/0.6/node/1/relations");
}

#[tokio::test]
async fn garbage_body_is_a_parse_error_not_a_transport_error() {
    let transport = MockTransport::new();
    transport.push_ok("<osm><node id=\"1\"");
    let client = client_over(&transport);

    match client.fetch_element(&ElementRef::node(1)).await {
        Err(OsmError::XmlParse { .. }) => {}
        other => panic!("expected XmlParse, got {other:?}"),
    }
}
