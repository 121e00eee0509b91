// In-memory panel for coordinator, entity and integration tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde_json::{Value, json};

use hkc_api::{Block, Input, PanelData, SystemStatus};

use crate::panel::PanelApi;

fn unavailable() -> hkc_api::Error {
    hkc_api::Error::Api {
        status: 503,
        message: "service unavailable".into(),
    }
}

pub(crate) struct FakePanel {
    authenticated: AtomicBool,
    arm_state: Mutex<u8>,
    in_alarm: AtomicBool,
    display: Mutex<String>,
    inputs: Mutex<Vec<Input>>,
    command_response: Mutex<Value>,
    fail_status: AtomicBool,
    fail_inputs: AtomicBool,
    fail_commands: AtomicBool,
    status_calls: AtomicUsize,
    panel_calls: AtomicUsize,
    inputs_calls: AtomicUsize,
    commands: Mutex<Vec<&'static str>>,
    /// Order in which read endpoints were hit.
    trace: Mutex<Vec<&'static str>>,
}

impl FakePanel {
    pub(crate) fn armed(arm_state: u8) -> Self {
        Self {
            authenticated: AtomicBool::new(true),
            arm_state: Mutex::new(arm_state),
            in_alarm: AtomicBool::new(false),
            display: Mutex::new("Mon 12 May 20:55".into()),
            inputs: Mutex::new(Vec::new()),
            command_response: Mutex::new(json!({ "code": 5 })),
            fail_status: AtomicBool::new(false),
            fail_inputs: AtomicBool::new(false),
            fail_commands: AtomicBool::new(false),
            status_calls: AtomicUsize::new(0),
            panel_calls: AtomicUsize::new(0),
            inputs_calls: AtomicUsize::new(0),
            commands: Mutex::new(Vec::new()),
            trace: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_inputs(self, inputs: Vec<Input>) -> Self {
        *self.inputs.lock().expect("lock") = inputs;
        self
    }

    pub(crate) fn set_authenticated(&self, ok: bool) {
        self.authenticated.store(ok, Ordering::SeqCst);
    }

    pub(crate) fn set_arm_state(&self, arm_state: u8) {
        *self.arm_state.lock().expect("lock") = arm_state;
    }

    pub(crate) fn set_in_alarm(&self, in_alarm: bool) {
        self.in_alarm.store(in_alarm, Ordering::SeqCst);
    }

    pub(crate) fn set_display(&self, display: &str) {
        *self.display.lock().expect("lock") = display.to_owned();
    }

    pub(crate) fn set_inputs(&self, inputs: Vec<Input>) {
        *self.inputs.lock().expect("lock") = inputs;
    }

    pub(crate) fn set_command_response(&self, response: Value) {
        *self.command_response.lock().expect("lock") = response;
    }

    pub(crate) fn fail_status(&self, fail: bool) {
        self.fail_status.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_inputs(&self, fail: bool) {
        self.fail_inputs.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_commands(&self, fail: bool) {
        self.fail_commands.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn panel_calls(&self) -> usize {
        self.panel_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn inputs_calls(&self) -> usize {
        self.inputs_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn commands(&self) -> Vec<&'static str> {
        self.commands.lock().expect("lock").clone()
    }

    pub(crate) fn trace(&self) -> Vec<&'static str> {
        self.trace.lock().expect("lock").clone()
    }

    fn command(&self, name: &'static str) -> Result<Value, hkc_api::Error> {
        self.commands.lock().expect("lock").push(name);
        if self.fail_commands.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.command_response.lock().expect("lock").clone())
    }
}

pub(crate) fn input(id: &str, description: &str, timestamp: &str, state: i64) -> Input {
    Input {
        input_id: id.into(),
        description: description.into(),
        timestamp: timestamp.into(),
        input_state: state,
    }
}

impl PanelApi for FakePanel {
    async fn check_login(&self) -> Result<bool, hkc_api::Error> {
        Ok(self.authenticated.load(Ordering::SeqCst))
    }

    async fn get_system_status(&self) -> Result<SystemStatus, hkc_api::Error> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.trace.lock().expect("lock").push("status");
        if self.fail_status.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(SystemStatus {
            blocks: vec![Block {
                arm_state: *self.arm_state.lock().expect("lock"),
                in_alarm: self.in_alarm.load(Ordering::SeqCst),
                user_allowed: true,
                ..Block::default()
            }],
        })
    }

    async fn get_panel(&self) -> Result<PanelData, hkc_api::Error> {
        self.panel_calls.fetch_add(1, Ordering::SeqCst);
        Ok(PanelData {
            green_led: json!(1),
            display: self.display.lock().expect("lock").clone(),
            ..PanelData::default()
        })
    }

    async fn get_all_inputs(&self) -> Result<Vec<Input>, hkc_api::Error> {
        self.inputs_calls.fetch_add(1, Ordering::SeqCst);
        self.trace.lock().expect("lock").push("inputs");
        if self.fail_inputs.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.inputs.lock().expect("lock").clone())
    }

    async fn arm_partset_a(&self) -> Result<Value, hkc_api::Error> {
        self.command("arm_partset_a")
    }

    async fn arm_partset_b(&self) -> Result<Value, hkc_api::Error> {
        self.command("arm_partset_b")
    }

    async fn arm_fullset(&self) -> Result<Value, hkc_api::Error> {
        self.command("arm_fullset")
    }

    async fn disarm(&self) -> Result<Value, hkc_api::Error> {
        self.command("disarm")
    }
}
