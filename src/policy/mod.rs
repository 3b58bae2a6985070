pub(crate) mod guardrail;
