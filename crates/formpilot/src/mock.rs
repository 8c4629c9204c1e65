//! MockDriver - in-memory practice form
//!
//! Models the behaviour the form model depends on: label-driven radio and
//! checkbox inputs hidden behind their labels, a client-rendered state/city
//! combo box whose city options depend on the chosen state, a tag input, a
//! date picker that accepts typed dates and a commit key, floating overlays
//! that intercept clicks on the submit button, and a confirmation modal
//! shown after a valid submission.
//!
//! Only the selector shapes used by [`crate::FormPage::demoqa`] are
//! understood; anything else is reported as a driver error.

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::driver::{FormDriver, Key};
use crate::locator::By;
use crate::result::{FormError, FormResult};
use crate::script;

/// States offered by the state dropdown, with their cities
pub const STATES: &[(&str, &[&str])] = &[
    ("NCR", &["Delhi", "Gurgaon", "Noida"]),
    ("Uttar Pradesh", &["Agra", "Lucknow", "Merrut"]),
    ("Haryana", &["Karnal", "Panipat"]),
    ("Rajasthan", &["Jaipur", "Jaiselmer"]),
];

/// Subjects the tag input autocompletes
pub const SUBJECTS: &[&str] = &[
    "Hindi",
    "English",
    "Maths",
    "Physics",
    "Chemistry",
    "Biology",
    "Computer Science",
    "Commerce",
    "Accounting",
    "Economics",
    "Arts",
    "Social Studies",
    "History",
    "Civics",
];

const DATE_FORMAT: &str = "%d %b %Y";
const TAG_CLASS: &str = "subjects-auto-complete__multi-value__label";

/// Handle to a node of the mock page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockElement(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeKind {
    Text { max_len: Option<usize> },
    Date,
    Tags,
    Radio,
    Checkbox,
    Label { target: String },
    Dropdown,
    DropdownValue { dropdown: String },
    DropdownOption { dropdown: String },
    Tag,
    Submit,
    Modal,
    Overlay,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    tag: &'static str,
    id: Option<String>,
    classes: Vec<String>,
    text: String,
    value: String,
    displayed: bool,
    enabled: bool,
    checked: bool,
    attached: bool,
    hidden_polls: u32,
}

impl Node {
    fn new(kind: NodeKind, tag: &'static str) -> Self {
        Self {
            kind,
            tag,
            id: None,
            classes: Vec::new(),
            text: String::new(),
            value: String::new(),
            displayed: true,
            enabled: true,
            checked: false,
            attached: true,
            hidden_polls: 0,
        }
    }

    fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    fn describe(&self) -> String {
        match (&self.kind, &self.id) {
            (_, Some(id)) => format!("#{id}"),
            (NodeKind::Label { target }, None) => format!("label[for={target}]"),
            (NodeKind::DropdownOption { .. }, None) => format!("option:{}", self.text),
            _ => match self.classes.first() {
                Some(class) => format!("{}.{class}", self.tag),
                None => self.tag.to_string(),
            },
        }
    }
}

#[derive(Debug, Default)]
struct MockPage {
    url: String,
    nodes: Vec<Node>,
    selected_all: Option<usize>,
    committed_date: String,
    open_menu: Option<String>,
    selections: HashMap<String, String>,
    console: Vec<String>,
    history: Vec<String>,
    closed: bool,
}

/// Mock driver for unit testing
#[derive(Debug, Default)]
pub struct MockDriver {
    page: Mutex<MockPage>,
    option_delay: u32,
    modal_delay: u32,
    render_delays: Vec<(String, u32)>,
    navigation_error: Option<String>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dropdown options stay absent for this many lookups after opening
    #[must_use]
    pub const fn with_option_delay(mut self, polls: u32) -> Self {
        self.option_delay = polls;
        self
    }

    /// The confirmation modal stays absent for this many lookups after submit
    #[must_use]
    pub const fn with_modal_delay(mut self, polls: u32) -> Self {
        self.modal_delay = polls;
        self
    }

    /// The element with `id` stays absent for this many lookups after navigation
    #[must_use]
    pub fn with_render_delay(mut self, id: impl Into<String>, polls: u32) -> Self {
        self.render_delays.push((id.into(), polls));
        self
    }

    /// Make every navigation fail with `message`
    #[must_use]
    pub fn with_navigation_error(mut self, message: impl Into<String>) -> Self {
        self.navigation_error = Some(message.into());
        self
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().map(|p| p.history.clone()).unwrap_or_default()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.history().iter().any(|c| c.starts_with(method))
    }

    /// Hide the element with `id`; returns whether it exists
    pub fn hide(&self, id: &str) -> bool {
        self.update_by_id(id, |n| n.displayed = false)
    }

    /// Disable the element with `id`; returns whether it exists
    pub fn disable(&self, id: &str) -> bool {
        self.update_by_id(id, |n| n.enabled = false)
    }

    /// Checked-state of the input with `id`
    #[must_use]
    pub fn is_checked(&self, id: &str) -> bool {
        self.read_by_id(id, |n| n.checked).unwrap_or(false)
    }

    /// Current value of the input with `id`
    #[must_use]
    pub fn value_of(&self, id: &str) -> Option<String> {
        self.read_by_id(id, |n| n.value.clone())
    }

    /// Whether `quit` has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().map(|p| p.closed).unwrap_or(false)
    }

    /// Whether any overlay element is still attached
    #[must_use]
    pub fn has_overlays(&self) -> bool {
        self.lock()
            .map(|p| {
                p.nodes
                    .iter()
                    .any(|n| n.attached && n.kind == NodeKind::Overlay)
            })
            .unwrap_or(false)
    }

    fn lock(&self) -> FormResult<MutexGuard<'_, MockPage>> {
        self.page
            .lock()
            .map_err(|_| FormError::driver("mock page lock poisoned"))
    }

    fn session(&self) -> FormResult<MutexGuard<'_, MockPage>> {
        let page = self.lock()?;
        if page.closed {
            return Err(FormError::driver("session closed"));
        }
        Ok(page)
    }

    fn update_by_id(&self, id: &str, f: impl FnOnce(&mut Node)) -> bool {
        let Ok(mut page) = self.lock() else {
            return false;
        };
        match page
            .nodes
            .iter_mut()
            .find(|n| n.attached && n.id.as_deref() == Some(id))
        {
            Some(node) => {
                f(node);
                true
            }
            None => false,
        }
    }

    fn read_by_id<T>(&self, id: &str, f: impl FnOnce(&Node) -> T) -> Option<T> {
        let page = self.lock().ok()?;
        page.nodes
            .iter()
            .find(|n| n.attached && n.id.as_deref() == Some(id))
            .map(f)
    }
}

fn captures<'t>(pattern: &str, text: &'t str) -> FormResult<Option<Captures<'t>>> {
    let re = Regex::new(pattern).map_err(|e| FormError::driver(e.to_string()))?;
    Ok(re.captures(text))
}

fn group(caps: &Captures<'_>, index: usize) -> String {
    caps.get(index)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn practice_form() -> Vec<Node> {
    let text = |id: &str, max_len: Option<usize>| {
        Node::new(NodeKind::Text { max_len }, "input").id(id)
    };
    let mut nodes = vec![
        Node::new(NodeKind::Overlay, "div").id("fixedban"),
        text("firstName", None),
        text("lastName", None),
        text("userEmail", None),
        text("userNumber", Some(10)),
        Node::new(NodeKind::Date, "input").id("dateOfBirthInput"),
        Node::new(NodeKind::Tags, "input").id("subjectsInput"),
        Node::new(NodeKind::Text { max_len: None }, "textarea").id("currentAddress"),
        Node::new(NodeKind::Dropdown, "div").id("state"),
        {
            let mut city = Node::new(NodeKind::Dropdown, "div").id("city");
            city.enabled = false;
            city
        },
        Node::new(NodeKind::Submit, "button").id("submit").text("Submit"),
        Node::new(NodeKind::Overlay, "footer"),
    ];
    for (n, label) in ["Male", "Female", "Other"].iter().enumerate() {
        let id = format!("gender-radio-{}", n + 1);
        let mut input = Node::new(NodeKind::Radio, "input").id(&id);
        input.displayed = false;
        nodes.push(input);
        nodes.push(Node::new(NodeKind::Label { target: id }, "label").text(label));
    }
    for (n, label) in ["Sports", "Reading", "Music"].iter().enumerate() {
        let id = format!("hobbies-checkbox-{}", n + 1);
        let mut input = Node::new(NodeKind::Checkbox, "input").id(&id);
        input.displayed = false;
        nodes.push(input);
        nodes.push(Node::new(NodeKind::Label { target: id }, "label").text(label));
    }
    nodes
}

impl MockPage {
    fn record(&mut self, entry: String) {
        self.history.push(entry);
    }

    fn attached(&self, index: usize) -> FormResult<&Node> {
        match self.nodes.get(index) {
            Some(node) if node.attached => Ok(node),
            Some(node) => Err(FormError::StaleElement {
                selector: node.describe(),
            }),
            None => Err(FormError::driver(format!("no mock node {index}"))),
        }
    }

    fn attached_mut(&mut self, index: usize) -> FormResult<&mut Node> {
        self.attached(index)?;
        self.nodes
            .get_mut(index)
            .ok_or_else(|| FormError::driver(format!("no mock node {index}")))
    }

    fn matches_css(node: &Node, css: &str) -> FormResult<bool> {
        if let Some(c) = captures(r"^#([\w-]+)$", css)? {
            return Ok(node.id.as_deref() == Some(&group(&c, 1)));
        }
        if let Some(c) = captures(r#"^\[id="([^"]+)"\]$"#, css)? {
            return Ok(node.id.as_deref() == Some(&group(&c, 1)));
        }
        if let Some(c) = captures(r"^\.([\w-]+)$", css)? {
            return Ok(node.classes.contains(&group(&c, 1)));
        }
        if let Some(c) = captures(r#"^label\[for=['"]([\w-]+)['"]\]$"#, css)? {
            let target = group(&c, 1);
            return Ok(matches!(&node.kind, NodeKind::Label { target: t } if *t == target));
        }
        if let Some(c) = captures(r"^([a-z]+)$", css)? {
            return Ok(node.tag == group(&c, 1));
        }
        Err(FormError::driver(format!("mock cannot evaluate css {css}")))
    }

    fn matches(node: &Node, by: &By) -> FormResult<bool> {
        match by {
            By::Id(id) => Ok(node.id.as_deref() == Some(id.as_str())),
            By::ClassName(class) => Ok(node.classes.iter().any(|c| c == class)),
            By::Css(css) => Self::matches_css(node, css),
            By::XPath(expr) => {
                if let Some(c) = captures(r#"^//div\[text\(\)=(?:'([^']*)'|"([^"]*)")\]$"#, expr)? {
                    let text = c.get(1).or_else(|| c.get(2)).map_or("", |m| m.as_str());
                    return Ok(node.tag == "div" && node.text == text);
                }
                if let Some(c) = captures(
                    r"^//div\[@id='([\w-]+)'\]//div\[contains\(@class, 'singleValue'\)\]$",
                    expr,
                )? {
                    let dropdown = group(&c, 1);
                    return Ok(
                        matches!(&node.kind, NodeKind::DropdownValue { dropdown: d } if *d == dropdown),
                    );
                }
                Err(FormError::driver(format!("mock cannot evaluate xpath {expr}")))
            }
        }
    }

    fn lookup(&mut self, by: &By) -> FormResult<Vec<usize>> {
        let mut found = Vec::new();
        for index in 0..self.nodes.len() {
            let node = &self.nodes[index];
            if !node.attached || !Self::matches(node, by)? {
                continue;
            }
            let node = &mut self.nodes[index];
            if node.hidden_polls > 0 {
                node.hidden_polls -= 1;
                continue;
            }
            found.push(index);
        }
        Ok(found)
    }

    fn lookup_css(&self, css: &str) -> FormResult<Vec<usize>> {
        let mut found = Vec::new();
        for (index, node) in self.nodes.iter().enumerate() {
            if node.attached && Self::matches_css(node, css)? {
                found.push(index);
            }
        }
        Ok(found)
    }

    fn index_of_id(&self, id: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| n.attached && n.id.as_deref() == Some(id))
    }

    fn close_menu(&mut self) {
        for node in &mut self.nodes {
            if matches!(node.kind, NodeKind::DropdownOption { .. }) {
                node.attached = false;
            }
        }
        self.open_menu = None;
    }

    fn show_menu(&mut self, dropdown: &str, delay: u32) {
        self.close_menu();
        let options: Vec<&str> = match dropdown {
            "state" => STATES.iter().map(|(s, _)| *s).collect(),
            "city" => self
                .selections
                .get("state")
                .and_then(|state| STATES.iter().find(|(s, _)| *s == state.as_str()))
                .map(|(_, cities)| cities.to_vec())
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        for option in options {
            let mut node = Node::new(
                NodeKind::DropdownOption {
                    dropdown: dropdown.to_string(),
                },
                "div",
            )
            .class("option")
            .text(option);
            node.hidden_polls = delay;
            self.nodes.push(node);
        }
        self.open_menu = Some(dropdown.to_string());
    }

    fn set_single_value(&mut self, dropdown: &str, text: Option<String>) {
        let existing = self.nodes.iter().position(|n| {
            n.attached && matches!(&n.kind, NodeKind::DropdownValue { dropdown: d } if d == dropdown)
        });
        match (existing, text) {
            (Some(index), Some(text)) => self.nodes[index].text = text,
            (Some(index), None) => self.nodes[index].attached = false,
            (None, Some(text)) => self.nodes.push(
                Node::new(
                    NodeKind::DropdownValue {
                        dropdown: dropdown.to_string(),
                    },
                    "div",
                )
                .class("singleValue")
                .text(&text),
            ),
            (None, None) => {}
        }
    }

    fn choose_option(&mut self, dropdown: &str, text: String) {
        let changed = self.selections.get(dropdown) != Some(&text);
        let _ = self.selections.insert(dropdown.to_string(), text.clone());
        self.set_single_value(dropdown, Some(text));
        if dropdown == "state" && changed {
            let _ = self.selections.remove("city");
            self.set_single_value("city", None);
            if let Some(city) = self.index_of_id("city") {
                self.nodes[city].enabled = true;
            }
        }
        self.close_menu();
    }

    fn submit(&mut self, modal_delay: u32) -> FormResult<()> {
        if let Some(overlay) = self
            .nodes
            .iter()
            .find(|n| n.attached && n.kind == NodeKind::Overlay)
        {
            return Err(FormError::driver(format!(
                "element click intercepted: {} would receive the click",
                overlay.describe()
            )));
        }
        let value = |page: &Self, id: &str| {
            page.index_of_id(id)
                .map(|i| page.nodes[i].value.clone())
                .unwrap_or_default()
        };
        let gender_chosen = self
            .nodes
            .iter()
            .any(|n| n.attached && n.kind == NodeKind::Radio && n.checked);
        let mobile = value(self, "userNumber");
        let email = value(self, "userEmail");
        let valid = !value(self, "firstName").is_empty()
            && !value(self, "lastName").is_empty()
            && gender_chosen
            && mobile.len() == 10
            && mobile.chars().all(|c| c.is_ascii_digit())
            && (email.is_empty() || (email.contains('@') && email.contains('.')));

        if valid {
            let mut modal = Node::new(NodeKind::Modal, "div")
                .class("modal-content")
                .text("Thanks for submitting the form");
            modal.hidden_polls = modal_delay;
            self.nodes.push(modal);
            self.console.push("[info] form submitted".to_string());
        } else {
            self.console.push("[warning] form validation failed".to_string());
        }
        Ok(())
    }

    fn click(&mut self, index: usize, option_delay: u32, modal_delay: u32) -> FormResult<()> {
        let node = self.attached(index)?.clone();
        if !node.displayed || !node.enabled {
            return Err(FormError::driver(format!(
                "element not interactable: {}",
                node.describe()
            )));
        }
        match node.kind {
            NodeKind::Label { target } => {
                let Some(input) = self.index_of_id(&target) else {
                    return Ok(());
                };
                match self.nodes[input].kind {
                    NodeKind::Radio => {
                        let prefix = target.rsplit_once('-').map_or("", |(p, _)| p).to_string();
                        for n in &mut self.nodes {
                            if n.kind == NodeKind::Radio
                                && n.id.as_deref().is_some_and(|id| id.starts_with(&prefix))
                            {
                                n.checked = false;
                            }
                        }
                        self.nodes[input].checked = true;
                    }
                    NodeKind::Checkbox => {
                        self.nodes[input].checked = !self.nodes[input].checked;
                    }
                    _ => {}
                }
            }
            NodeKind::Dropdown => {
                let dropdown = node.id.unwrap_or_default();
                self.show_menu(&dropdown, option_delay);
            }
            NodeKind::DropdownOption { dropdown } => self.choose_option(&dropdown, node.text),
            NodeKind::Submit => self.submit(modal_delay)?,
            _ => {}
        }
        Ok(())
    }

    fn type_into(&mut self, index: usize, text: &str) -> FormResult<()> {
        let replace = self.selected_all.take() == Some(index);
        let node = self.attached_mut(index)?;
        if !node.enabled {
            return Err(FormError::driver(format!(
                "element not interactable: {}",
                node.describe()
            )));
        }
        if replace {
            node.value.clear();
        }
        node.value.push_str(text);
        if let NodeKind::Text {
            max_len: Some(max_len),
        } = node.kind
        {
            node.value = node.value.chars().take(max_len).collect();
        }
        Ok(())
    }

    fn commit(&mut self, index: usize) -> FormResult<()> {
        let node = self.attached(index)?.clone();
        match node.kind {
            NodeKind::Tags => {
                let pending = node.value.trim().to_lowercase();
                if pending.is_empty() {
                    return Ok(());
                }
                if let Some(subject) = SUBJECTS
                    .iter()
                    .find(|s| s.to_lowercase().contains(&pending))
                {
                    self.nodes[index].value.clear();
                    self.nodes
                        .push(Node::new(NodeKind::Tag, "div").class(TAG_CLASS).text(subject));
                }
            }
            NodeKind::Date => {
                let committed = match NaiveDate::parse_from_str(node.value.trim(), DATE_FORMAT) {
                    Ok(date) => date.format(DATE_FORMAT).to_string(),
                    Err(_) => self.committed_date.clone(),
                };
                self.committed_date = committed.clone();
                self.nodes[index].value = committed;
            }
            _ => {}
        }
        Ok(())
    }

    fn html(&self) -> String {
        let mut html = format!("<html><head><title>{}</title></head><body>", self.url);
        for node in self.nodes.iter().filter(|n| n.attached) {
            let id = node
                .id
                .as_ref()
                .map(|id| format!(" id=\"{id}\""))
                .unwrap_or_default();
            let class = if node.classes.is_empty() {
                String::new()
            } else {
                format!(" class=\"{}\"", node.classes.join(" "))
            };
            html.push_str(&format!(
                "<{tag}{id}{class} value=\"{value}\">{text}</{tag}>",
                tag = node.tag,
                value = node.value,
                text = node.text
            ));
        }
        html.push_str("</body></html>");
        html
    }
}

#[async_trait]
impl FormDriver for MockDriver {
    type Element = MockElement;

    async fn navigate(&self, url: &str) -> FormResult<()> {
        let mut page = self.session()?;
        page.record(format!("navigate:{url}"));
        if let Some(ref message) = self.navigation_error {
            return Err(FormError::NavigationFailure {
                url: url.to_string(),
                message: message.clone(),
            });
        }
        page.url = url.to_string();
        page.nodes = practice_form();
        page.selections.clear();
        page.open_menu = None;
        page.selected_all = None;
        page.committed_date = chrono::Local::now().format(DATE_FORMAT).to_string();
        let today = page.committed_date.clone();
        if let Some(date) = page.index_of_id("dateOfBirthInput") {
            page.nodes[date].value = today;
        }
        for (id, polls) in &self.render_delays {
            if let Some(index) = page.index_of_id(id) {
                page.nodes[index].hidden_polls = *polls;
            }
        }
        Ok(())
    }

    async fn find_element(&self, by: &By) -> FormResult<MockElement> {
        let mut page = self.session()?;
        page.lookup(by)?
            .first()
            .map(|&i| MockElement(i))
            .ok_or_else(|| FormError::ElementNotFound {
                selector: by.to_string(),
            })
    }

    async fn find_elements(&self, by: &By) -> FormResult<Vec<MockElement>> {
        let mut page = self.session()?;
        Ok(page.lookup(by)?.into_iter().map(MockElement).collect())
    }

    async fn click(&self, element: &MockElement) -> FormResult<()> {
        let mut page = self.session()?;
        let desc = page.attached(element.0)?.describe();
        page.record(format!("click:{desc}"));
        page.click(element.0, self.option_delay, self.modal_delay)
    }

    async fn clear(&self, element: &MockElement) -> FormResult<()> {
        let mut page = self.session()?;
        let node = page.attached_mut(element.0)?;
        node.value.clear();
        let desc = node.describe();
        page.record(format!("clear:{desc}"));
        Ok(())
    }

    async fn send_keys(&self, element: &MockElement, text: &str) -> FormResult<()> {
        let mut page = self.session()?;
        let desc = page.attached(element.0)?.describe();
        page.record(format!("send_keys:{desc}:{text}"));
        page.type_into(element.0, text)
    }

    async fn press_key(&self, element: &MockElement, key: Key) -> FormResult<()> {
        let mut page = self.session()?;
        let desc = page.attached(element.0)?.describe();
        page.record(format!("press_key:{desc}:{key}"));
        match key {
            Key::Enter => page.commit(element.0),
        }
    }

    async fn select_all(&self, element: &MockElement) -> FormResult<()> {
        let mut page = self.session()?;
        let desc = page.attached(element.0)?.describe();
        page.record(format!("select_all:{desc}"));
        page.selected_all = Some(element.0);
        Ok(())
    }

    async fn scroll_into_view(&self, element: &MockElement) -> FormResult<()> {
        let mut page = self.session()?;
        let desc = page.attached(element.0)?.describe();
        page.record(format!("scroll:{desc}"));
        Ok(())
    }

    async fn text(&self, element: &MockElement) -> FormResult<String> {
        let page = self.session()?;
        Ok(page.attached(element.0)?.text.clone())
    }

    async fn value(&self, element: &MockElement) -> FormResult<String> {
        let page = self.session()?;
        Ok(page.attached(element.0)?.value.clone())
    }

    async fn is_displayed(&self, element: &MockElement) -> FormResult<bool> {
        let page = self.session()?;
        Ok(page.attached(element.0)?.displayed)
    }

    async fn is_enabled(&self, element: &MockElement) -> FormResult<bool> {
        let page = self.session()?;
        Ok(page.attached(element.0)?.enabled)
    }

    async fn is_selected(&self, element: &MockElement) -> FormResult<bool> {
        let page = self.session()?;
        Ok(page.attached(element.0)?.checked)
    }

    async fn execute_script(&self, source: &str) -> FormResult<serde_json::Value> {
        let mut page = self.session()?;
        page.record(format!("script:{source}"));
        if source == script::READY_STATE {
            let state = if page.url.is_empty() { "loading" } else { "complete" };
            return Ok(serde_json::Value::from(state));
        }
        if let Some(c) = captures(r"^document\.querySelectorAll\((.*)\)\.length$", source)? {
            let css: String = serde_json::from_str(&group(&c, 1))?;
            return Ok(serde_json::Value::from(page.lookup_css(&css)?.len()));
        }
        if let Some(c) = captures(
            r"^document\.querySelectorAll\((.*)\)\.forEach\(e => e\.remove\(\)\)$",
            source,
        )? {
            let css: String = serde_json::from_str(&group(&c, 1))?;
            for index in page.lookup_css(&css)? {
                page.nodes[index].attached = false;
            }
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::Value::Null)
    }

    async fn screenshot(&self) -> FormResult<Vec<u8>> {
        let _page = self.session()?;
        Ok(vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])
    }

    async fn page_source(&self) -> FormResult<String> {
        let page = self.session()?;
        Ok(page.html())
    }

    async fn console_logs(&self) -> FormResult<Vec<String>> {
        let page = self.session()?;
        Ok(page.console.clone())
    }

    async fn quit(&self) -> FormResult<()> {
        let mut page = self.lock()?;
        page.record("quit".to_string());
        page.closed = true;
        Ok(())
    }
}
