use crate::monitoring::{AlarmThresholds, AlarmWithAnnotation, Severity};
use crate::stack::Template;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// Collects everything handed to an alarm consumer
#[derive(Clone, Default)]
pub struct AlarmRecorder {
    calls: Rc<RefCell<Vec<Vec<String>>>>,
}

impl AlarmRecorder {
    pub fn consumer(&self) -> impl Fn(&[AlarmWithAnnotation]) + 'static {
        let calls = Rc::clone(&self.calls);
        move |alarms: &[AlarmWithAnnotation]| {
            calls
                .borrow_mut()
                .push(alarms.iter().map(|a| a.alarm_name().to_string()).collect());
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    pub fn total(&self) -> usize {
        self.calls.borrow().iter().map(Vec::len).sum()
    }
}

pub fn thresholds<T>(entries: Vec<(Severity, T)>) -> AlarmThresholds<T> {
    entries.into_iter().collect()
}

pub fn alarm_properties(template: &Template) -> Vec<Value> {
    template
        .find_resources("AWS::CloudWatch::Alarm")
        .into_values()
        .map(|resource| resource["Properties"].clone())
        .collect()
}

pub fn alarm_by_name(template: &Template, name: &str) -> Option<Value> {
    alarm_properties(template)
        .into_iter()
        .find(|props| props["AlarmName"] == Value::String(name.to_string()))
}
