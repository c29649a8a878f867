//! Built-in starter corpus.

use crate::challenge::{Category, ChallengeTemplate, Difficulty, TrainingPath};

use Category::*;
use Difficulty::*;
use TrainingPath::*;

type Row = (
    TrainingPath,
    Difficulty,
    Category,
    u32,
    &'static str,
    &'static str,
    &'static [&'static str],
);

const ROWS: &[Row] = &[
    // discipline
    (Discipline, Micro, Physical, 2, "Make your bed", "Start the day with one finished task.", &["morning"]),
    (Discipline, Micro, Digital, 5, "Phone in another room", "Leave your phone out of reach for the first hour.", &["focus"]),
    (Discipline, Micro, Mental, 5, "Two-minute tidy", "Clear one surface before you sit down to work.", &["environment"]),
    (Discipline, Standard, Physical, 20, "Cold finish", "End your shower with sixty seconds of cold water.", &["body", "morning"]),
    (Discipline, Standard, Mental, 30, "Deep work block", "Work on your hardest task for thirty uninterrupted minutes.", &["focus"]),
    (Discipline, Standard, Digital, 15, "Notification purge", "Turn off every non-essential notification.", &["screens"]),
    (Discipline, Advanced, Physical, 45, "Dawn session", "Wake an hour early and train before breakfast.", &["body", "morning"]),
    // clarity
    (Clarity, Micro, Mental, 3, "Three breaths", "Pause for three slow breaths before your next decision.", &["breath"]),
    (Clarity, Micro, Creative, 5, "One-line journal", "Write a single sentence about what is on your mind.", &["journal"]),
    (Clarity, Micro, Spiritual, 5, "Name the feeling", "Label the strongest emotion you feel right now.", &["emotion"]),
    (Clarity, Standard, Mental, 15, "Brain dump", "Write every open loop on paper, then circle one.", &["journal", "planning"]),
    (Clarity, Standard, Digital, 60, "Digital sunset", "No screens for the last hour before bed.", &["evening", "screens"]),
    (Clarity, Standard, Spiritual, 10, "Silent walk", "Walk for ten minutes without audio or phone.", &["walk"]),
    (Clarity, Advanced, Spiritual, 40, "Half-day offline", "Spend a morning or afternoon fully offline.", &["screens"]),
    // confidence
    (Confidence, Micro, Social, 2, "Hold eye contact", "Keep eye contact through one full conversation.", &["presence"]),
    (Confidence, Micro, Social, 3, "Say your name first", "Introduce yourself before someone else does.", &["presence"]),
    (Confidence, Micro, Mental, 5, "List a win", "Write down one thing you did well today.", &["journal"]),
    (Confidence, Standard, Social, 15, "Ask the question", "Ask the question you usually keep to yourself.", &["voice"]),
    (Confidence, Standard, Social, 10, "Compliment a stranger", "Give a sincere compliment to someone new.", &["kindness"]),
    (Confidence, Standard, Creative, 20, "Share unfinished work", "Show a draft to someone and ask for feedback.", &["feedback"]),
    (Confidence, Advanced, Social, 30, "Speak first", "Be the first to speak in a meeting or group.", &["voice"]),
    // purpose
    (Purpose, Micro, Mental, 5, "One reason why", "Write why today's main task matters to you.", &["values"]),
    (Purpose, Micro, Spiritual, 5, "Gratitude trio", "List three things you are grateful for.", &["gratitude"]),
    (Purpose, Micro, General, 3, "Set a daily intention", "Choose one word to guide your day.", &["morning"]),
    (Purpose, Standard, Creative, 20, "Ideal week sketch", "Sketch what a meaningful week would look like.", &["planning"]),
    (Purpose, Standard, Social, 15, "Thank a mentor", "Message someone who shaped your path.", &["gratitude"]),
    (Purpose, Standard, Mental, 25, "Values audit", "Rank your top five values and check today against them.", &["values"]),
    (Purpose, Advanced, General, 60, "Volunteer hour", "Give an hour of your time to a cause you care about.", &["service"]),
    // authenticity
    (Authenticity, Micro, Social, 2, "Honest answer", "Answer 'how are you' truthfully once today.", &["honesty"]),
    (Authenticity, Micro, Creative, 5, "Wear what you like", "Choose one thing to wear purely for yourself.", &["expression"]),
    (Authenticity, Micro, Mental, 5, "Notice a mask", "Catch one moment where you performed instead of being.", &["awareness"]),
    (Authenticity, Standard, Social, 15, "Say no kindly", "Decline one request that does not fit you.", &["boundaries"]),
    (Authenticity, Standard, Creative, 20, "Three truths", "Write three true things you rarely say out loud.", &["journal", "honesty"]),
    (Authenticity, Standard, Social, 20, "Share an opinion", "Share a real opinion in a conversation today.", &["voice"]),
    (Authenticity, Advanced, Social, 45, "Hard conversation", "Have the conversation you have been avoiding.", &["honesty", "boundaries"]),
];

pub(super) fn templates() -> Vec<ChallengeTemplate> {
    ROWS.iter()
        .map(|&(path, difficulty, category, minutes, title, description, tags)| {
            ChallengeTemplate::new(title, path, difficulty, category, minutes)
                .with_description(description)
                .with_tags(tags.iter().copied())
        })
        .collect()
}
