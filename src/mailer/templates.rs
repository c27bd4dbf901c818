use chrono::{DateTime, Utc};

use super::Email;
use crate::services::reminder::INACTIVITY_DAYS;

const PROBLEMSET_URL: &str = "https://codeforces.com/problemset";

pub fn reminder(to: &str, name: &str, reminder_count: i64) -> Email {
    let subject = "Coding Practice Reminder - Get Back to Problem Solving! 🚀".to_string();

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>Coding Practice Reminder</title>
</head>
<body style="font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; background-color: #f8fafc;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background: white; border-radius: 12px; padding: 32px;">
      <h2 style="color: #1e293b;">Hi {name}! 👋</h2>
      <p style="color: #475569;">
        We noticed you haven't made any submissions on Codeforces in the last
        <strong>{days} days</strong>. Consistent practice is the key to improving
        your programming skills!
      </p>
      <ul style="color: #475569;">
        <li><strong>Start Small:</strong> begin with easier problems to build momentum</li>
        <li><strong>Daily Habit:</strong> set aside 30 minutes daily for focused practice</li>
        <li><strong>Review:</strong> analyze your previous submissions to learn from mistakes</li>
        <li><strong>Join Contests:</strong> try virtual contests to simulate real competition</li>
      </ul>
      <p style="text-align: center;">
        <a href="{url}" style="background: #3b82f6; color: white; padding: 14px 28px; border-radius: 8px; text-decoration: none;">Start Solving Problems 🎯</a>
      </p>
      <p style="color: #64748b; font-size: 14px; border-top: 1px solid #e2e8f0; padding-top: 20px;">
        This is reminder #{count}. Keep coding and keep growing! 🚀<br>
        <small>Don't want to receive these emails? Contact your instructor to disable notifications.</small>
      </p>
    </div>
  </div>
</body>
</html>"#,
        name = escape_html(name),
        days = INACTIVITY_DAYS,
        url = PROBLEMSET_URL,
        count = reminder_count,
    );

    let text = format!(
        "Hi {name}!\n\n\
         We noticed you haven't made any submissions on Codeforces in the last {days} days.\n\
         Consistent practice is key to improving your programming skills!\n\n\
         Quick Tips:\n\
         - Start with easier problems to build momentum\n\
         - Set aside 30 minutes daily for practice\n\
         - Review your previous submissions to learn from mistakes\n\
         - Join virtual contests to simulate real competition\n\n\
         Visit {url} to start solving problems.\n\n\
         This is reminder #{count}. Keep coding and keep growing!\n",
        name = name,
        days = INACTIVITY_DAYS,
        url = PROBLEMSET_URL,
        count = reminder_count,
    );

    Email { to: to.to_string(), subject, html, text }
}

pub fn test_email(to: &str, sent_at: DateTime<Utc>) -> Email {
    let sent_at = sent_at.format("%Y-%m-%d %H:%M:%S UTC");
    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<body style="font-family: Arial, sans-serif; background-color: #f5f5f5;">
  <div style="max-width: 600px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px;">
    <h2 style="color: #2563eb;">🎉 Email Configuration Test</h2>
    <p><strong>✅ Success!</strong> Your SMTP configuration is working correctly.</p>
    <p>Reminder emails will work for inactive students.</p>
    <p style="color: #6b7280; font-size: 14px;"><small>Test email sent at {sent_at}</small></p>
  </div>
</body>
</html>"#
    );
    let text = format!(
        "Email Configuration Test\n\n\
         Success! Your SMTP configuration is working correctly.\n\
         Reminder emails will work for inactive students.\n\n\
         Test email sent at {sent_at}\n"
    );

    Email {
        to: to.to_string(),
        subject: "Test Email - Student Progress Management System ✅".to_string(),
        html,
        text,
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
