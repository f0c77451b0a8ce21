//! School lookup tools - student records, results, attendance and schedules
//!
//! Each tool is a single map lookup over [`SchoolRecords`] with a fallback
//! string when the key is unknown.

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use tracing::info;
use crate::Result;
use super::{required_str, Tool};

/// A student's profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentRecord {
    pub name: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub age: u32,
    pub parent: String,
}

/// Subject grades, kept in the order the subjects were recorded
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grades(Vec<(String, String)>);

impl Grades {
    pub fn get(&self, subject: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(s, _)| s == subject)
            .map(|(_, grade)| grade.as_str())
    }
}

impl Serialize for Grades {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (subject, grade) in &self.0 {
            map.serialize_entry(subject, grade)?;
        }
        map.end()
    }
}

/// Read-only demo tables, built once at startup
#[derive(Debug, Default)]
pub struct SchoolRecords {
    students: HashMap<String, StudentRecord>,
    results: HashMap<String, Grades>,
    attendance: HashMap<String, String>,
    schedules: HashMap<String, String>,
}

impl SchoolRecords {
    /// The Swift Solves Studios demo data
    pub fn demo() -> Self {
        const STUDENTS: [(&str, &str, &str, u32, &str); 10] = [
            ("101", "Alice Johnson", "5A", 10, "Mr. Johnson"),
            ("102", "Bob Smith", "6B", 11, "Mrs. Smith"),
            ("103", "Charlie Brown", "4C", 9, "Mr. Brown"),
            ("104", "Diana Davis", "7D", 12, "Mrs. Davis"),
            ("105", "Eva White", "3E", 8, "Mr. White"),
            ("106", "Frank Miller", "8F", 13, "Mrs. Miller"),
            ("107", "Grace Taylor", "2G", 7, "Mr. Taylor"),
            ("108", "Henry Clark", "9H", 14, "Mrs. Clark"),
            ("109", "Ivy Lee", "1I", 6, "Mr. Lee"),
            ("110", "Jack Wilson", "10J", 15, "Mrs. Wilson"),
        ];
        const RESULTS: [(&str, [(&str, &str); 3]); 3] = [
            ("101", [("Math", "A"), ("Science", "B+"), ("English", "A-")]),
            ("102", [("Math", "B"), ("Science", "A"), ("English", "B+")]),
            ("103", [("Math", "C+"), ("Science", "A-"), ("English", "C")]),
        ];
        const ATTENDANCE: [(&str, &str); 3] = [
            ("101", "Present: 90%, Absent: 10%"),
            ("102", "Present: 85%, Absent: 15%"),
            ("103", "Present: 80%, Absent: 20%"),
        ];
        const SCHEDULES: [(&str, &str); 2] = [
            ("5A", "Math - 9 AM, Science - 11 AM, English - 1 PM"),
            ("6B", "English - 10 AM, Math - 12 PM, Science - 2 PM"),
        ];

        let students = STUDENTS
            .iter()
            .map(|(id, name, class_name, age, parent)| {
                let record = StudentRecord {
                    name: name.to_string(),
                    class_name: class_name.to_string(),
                    age: *age,
                    parent: parent.to_string(),
                };
                (id.to_string(), record)
            })
            .collect();

        let results = RESULTS
            .iter()
            .map(|(id, grades)| {
                let grades = grades
                    .iter()
                    .map(|(subject, grade)| (subject.to_string(), grade.to_string()))
                    .collect();
                (id.to_string(), Grades(grades))
            })
            .collect();

        Self {
            students,
            results,
            attendance: to_owned_map(&ATTENDANCE),
            schedules: to_owned_map(&SCHEDULES),
        }
    }

    pub fn student(&self, id: &str) -> Option<&StudentRecord> {
        self.students.get(id)
    }

    pub fn results(&self, id: &str) -> Option<&Grades> {
        self.results.get(id)
    }

    pub fn attendance(&self, id: &str) -> Option<&str> {
        self.attendance.get(id).map(String::as_str)
    }

    pub fn schedule(&self, class_name: &str) -> Option<&str> {
        self.schedules.get(class_name).map(String::as_str)
    }
}

fn to_owned_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn student_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "student_id": {
                "type": "string",
                "description": "Student ID, e.g. \"101\""
            }
        },
        "required": ["student_id"]
    })
}

/// Get the student data by student ID
pub struct StudentDataTool {
    records: Arc<SchoolRecords>,
}

impl StudentDataTool {
    pub fn new(records: Arc<SchoolRecords>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl Tool for StudentDataTool {
    fn name(&self) -> &str { "get_student_data" }
    fn description(&self) -> &str { "Get the student data by student ID" }
    fn step_label(&self) -> &str { "student data tool" }
    fn parameters(&self) -> Value { student_id_schema() }

    async fn execute(&self, params: Value) -> Result<String> {
        let student_id = required_str(&params, "student_id")?;
        info!("Getting student data for {}", student_id);

        match self.records.student(student_id) {
            Some(record) => Ok(serde_json::to_string(record)?),
            None => Ok("Student not found".to_string()),
        }
    }
}

/// Get the student result by student ID
pub struct StudentResultTool {
    records: Arc<SchoolRecords>,
}

impl StudentResultTool {
    pub fn new(records: Arc<SchoolRecords>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl Tool for StudentResultTool {
    fn name(&self) -> &str { "get_student_result" }
    fn description(&self) -> &str { "Get the student result by student ID" }
    fn step_label(&self) -> &str { "student result tool" }
    fn parameters(&self) -> Value { student_id_schema() }

    async fn execute(&self, params: Value) -> Result<String> {
        let student_id = required_str(&params, "student_id")?;
        info!("Getting student result for {}", student_id);

        match self.records.results(student_id) {
            Some(grades) => Ok(serde_json::to_string(grades)?),
            None => Ok("Result not found".to_string()),
        }
    }
}

/// Get the student attendance by student ID
pub struct StudentAttendanceTool {
    records: Arc<SchoolRecords>,
}

impl StudentAttendanceTool {
    pub fn new(records: Arc<SchoolRecords>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl Tool for StudentAttendanceTool {
    fn name(&self) -> &str { "get_student_attendance" }
    fn description(&self) -> &str { "Get the student attendance by student ID" }
    fn step_label(&self) -> &str { "student attendance tool" }
    fn parameters(&self) -> Value { student_id_schema() }

    async fn execute(&self, params: Value) -> Result<String> {
        let student_id = required_str(&params, "student_id")?;
        info!("Getting student attendance for {}", student_id);

        Ok(self
            .records
            .attendance(student_id)
            .unwrap_or("Attendance not found")
            .to_string())
    }
}

/// Get the class schedule by class name
pub struct ClassScheduleTool {
    records: Arc<SchoolRecords>,
}

impl ClassScheduleTool {
    pub fn new(records: Arc<SchoolRecords>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl Tool for ClassScheduleTool {
    fn name(&self) -> &str { "get_class_schedule" }
    fn description(&self) -> &str { "Get the class schedule by class name" }
    fn step_label(&self) -> &str { "class schedule tool" }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "class_name": {
                    "type": "string",
                    "description": "Class name, e.g. \"5A\""
                }
            },
            "required": ["class_name"]
        })
    }

    async fn execute(&self, params: Value) -> Result<String> {
        let class_name = required_str(&params, "class_name")?;
        info!("Getting class schedule for {}", class_name);

        Ok(self
            .records
            .schedule(class_name)
            .unwrap_or("Schedule not found")
            .to_string())
    }
}
