//! Tool-dispatch behavior of the agent turn runner

use std::sync::Arc;

use mediline_gateway::llm::{ChatResponse, Role};
use mediline_gateway::{
    AppointmentScheduler, AvailabilityService, Conversation, Dispatcher, Slot,
};

mod common;

use common::{FakeCalendar, ScriptedChat, at, tool_call};

fn dispatcher(chat: Arc<ScriptedChat>, calendar: Arc<FakeCalendar>) -> Dispatcher {
    let calendar = calendar as Arc<dyn mediline_gateway::CalendarApi>;
    Dispatcher::new(
        chat,
        AvailabilityService::new(Arc::clone(&calendar)),
        AppointmentScheduler::new(calendar, "Dr. Ali", None),
    )
}

#[tokio::test]
async fn turn_without_tool_calls_returns_content_directly() {
    let chat = Arc::new(ScriptedChat::new(vec![ChatResponse {
        content: Some("What is your name?".to_string()),
        tool_calls: vec![],
    }]));
    let calendar = Arc::new(FakeCalendar::new());
    let dispatcher = dispatcher(Arc::clone(&chat), calendar);

    let mut conversation = Conversation::new("you schedule appointments", 64);
    conversation.push(mediline_gateway::llm::ChatMessage::user("hello"));
    let before = conversation.len();

    let reply = dispatcher
        .run_turn(&mut conversation, "patient", at("2024-09-20 08:00:00"))
        .await
        .unwrap();

    assert_eq!(reply, "What is your name?");
    // exactly one turn appended: the assistant's, with no second round-trip
    assert_eq!(conversation.len(), before + 1);
    let requests = chat.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].tool_count, 3);
}

#[tokio::test]
async fn tool_round_executes_and_feeds_results_back() {
    let chat = Arc::new(ScriptedChat::new(vec![
        ChatResponse {
            content: None,
            tool_calls: vec![tool_call(
                "call_1",
                "get_available_slots",
                r#"{"date":"2024-09-25","start_time":"9:00 AM","end_time":"11:00 AM"}"#,
            )],
        },
        ChatResponse {
            content: Some("There is an opening at 9:00 AM.".to_string()),
            tool_calls: vec![],
        },
    ]));
    let calendar = Arc::new(FakeCalendar::new());
    calendar.set_day(
        "2024-09-25",
        vec![Slot::new("9:00 AM", false), Slot::new("10:00 AM", true)],
    );
    let dispatcher = dispatcher(Arc::clone(&chat), calendar);

    let mut conversation = Conversation::new("you schedule appointments", 64);
    conversation.push(mediline_gateway::llm::ChatMessage::user(
        "anything between 9 and 11 on the 25th?",
    ));

    let reply = dispatcher
        .run_turn(&mut conversation, "patient", at("2024-09-20 08:00:00"))
        .await
        .unwrap();

    assert_eq!(reply, "There is an opening at 9:00 AM.");

    // system, user, assistant tool-call turn, tool result, final assistant
    let messages = conversation.messages();
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[2].role, Role::Assistant);
    assert!(messages[2].tool_calls.is_some());
    assert_eq!(messages[3].role, Role::Tool);
    assert_eq!(messages[3].tool_call_id.as_deref(), Some("call_1"));
    assert_eq!(messages[3].content.as_deref(), Some("9:00 AM"));

    // second completion goes out with tools disabled
    let requests = chat.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].tool_count, 3);
    assert_eq!(requests[1].tool_count, 0);
}

#[tokio::test]
async fn twenty_four_hour_window_arguments_are_normalized() {
    let chat = Arc::new(ScriptedChat::new(vec![
        ChatResponse {
            content: None,
            tool_calls: vec![tool_call(
                "call_1",
                "get_available_slots",
                r#"{"date":"2024-09-25","start_time":"09:00","end_time":"11:00"}"#,
            )],
        },
        ChatResponse {
            content: Some("done".to_string()),
            tool_calls: vec![],
        },
    ]));
    let calendar = Arc::new(FakeCalendar::new());
    calendar.set_day("2024-09-25", vec![Slot::new("9:00 AM", false)]);
    let dispatcher = dispatcher(Arc::clone(&chat), calendar);

    let mut conversation = Conversation::new("you schedule appointments", 64);
    conversation.push(mediline_gateway::llm::ChatMessage::user("slots?"));

    dispatcher
        .run_turn(&mut conversation, "patient", at("2024-09-20 08:00:00"))
        .await
        .unwrap();

    assert_eq!(conversation.messages()[3].content.as_deref(), Some("9:00 AM"));
}

#[tokio::test]
async fn unknown_tool_becomes_an_error_payload_not_a_failed_turn() {
    let chat = Arc::new(ScriptedChat::new(vec![
        ChatResponse {
            content: None,
            tool_calls: vec![tool_call("call_1", "cancel_appointment", "{}")],
        },
        ChatResponse {
            content: Some("I cannot cancel appointments.".to_string()),
            tool_calls: vec![],
        },
    ]));
    let calendar = Arc::new(FakeCalendar::new());
    let dispatcher = dispatcher(Arc::clone(&chat), calendar);

    let mut conversation = Conversation::new("you schedule appointments", 64);
    conversation.push(mediline_gateway::llm::ChatMessage::user("cancel it"));

    let reply = dispatcher
        .run_turn(&mut conversation, "patient", at("2024-09-20 08:00:00"))
        .await
        .unwrap();

    assert_eq!(reply, "I cannot cancel appointments.");
    let payload: serde_json::Value =
        serde_json::from_str(conversation.messages()[3].content.as_deref().unwrap()).unwrap();
    assert_eq!(payload["error"], "unknown tool: cancel_appointment");
}

#[tokio::test]
async fn roster_tool_returns_doctor_listing() {
    let chat = Arc::new(ScriptedChat::new(vec![
        ChatResponse {
            content: None,
            tool_calls: vec![tool_call("call_1", "show_available_doctors", "{}")],
        },
        ChatResponse {
            content: Some("We have four doctors.".to_string()),
            tool_calls: vec![],
        },
    ]));
    let calendar = Arc::new(FakeCalendar::new());
    let dispatcher = dispatcher(Arc::clone(&chat), calendar);

    let mut conversation = Conversation::new("you schedule appointments", 64);
    conversation.push(mediline_gateway::llm::ChatMessage::user("who do you have?"));

    dispatcher
        .run_turn(&mut conversation, "patient", at("2024-09-20 08:00:00"))
        .await
        .unwrap();

    let roster: serde_json::Value =
        serde_json::from_str(conversation.messages()[3].content.as_deref().unwrap()).unwrap();
    assert_eq!(roster.as_array().unwrap().len(), 4);
    assert_eq!(roster[0]["specialty"], "Cardiologist");
}
